use strand_common::Result;

use crate::column::CollectedColumn;

/// Receives the columns produced by a decode session.
///
/// This is the hand-off point to whatever array or tensor representation
/// the caller materializes columns into.
pub trait ColumnSink<'a> {
    /// Accepts the column for output slot `output`.
    fn accept(&mut self, output: usize, column: CollectedColumn<'a>) -> Result<()>;
}

impl<'a> ColumnSink<'a> for Vec<(usize, CollectedColumn<'a>)> {
    fn accept(&mut self, output: usize, column: CollectedColumn<'a>) -> Result<()> {
        self.push((output, column));
        Ok(())
    }
}
