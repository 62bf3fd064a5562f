//! Batched reading of records from several leaf columns at once.

use serde::{Deserialize, Serialize};
use strand_common::{Result, error::Error, verify_arg};

use crate::{parent_indices::ParentIndicesBuilder, repetition::RepetitionPattern};

/// A leaf column of level entries that can be inspected one entry ahead.
///
/// Each entry carries a definition level, a repetition level and, when the
/// leaf is present (definition level at its maximum), a value.
pub trait PeekableLevels {
    type Value;

    /// Returns the `(definition_level, repetition_level)` of the current
    /// entry, or `None` once the column is exhausted.
    fn peek_levels(&self) -> Option<(i16, i16)>;

    /// Returns the value of the current entry, if the entry has one.
    fn peek_value(&self) -> Option<&Self::Value>;

    /// Moves to the next entry.
    ///
    /// # Errors
    ///
    /// `EndOfColumn` when called on an exhausted column; any other error
    /// comes from the underlying source.
    fn advance(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelEntry<T> {
    pub definition_level: i16,
    pub repetition_level: i16,
    pub value: Option<T>,
}

/// In-memory [`PeekableLevels`] column.
#[derive(Debug, Clone)]
pub struct LevelColumn<T> {
    entries: Vec<LevelEntry<T>>,
    pos: usize,
}

impl<T> LevelColumn<T> {
    pub fn new(entries: Vec<LevelEntry<T>>) -> LevelColumn<T> {
        LevelColumn { entries, pos: 0 }
    }

    /// Builds a column from parallel level slices and the values of the
    /// entries whose definition level equals `max_definition_level`, in
    /// order.
    pub fn from_levels(
        definition_levels: &[i16],
        repetition_levels: &[i16],
        values: impl IntoIterator<Item = T>,
        max_definition_level: i16,
    ) -> Result<LevelColumn<T>> {
        if definition_levels.len() != repetition_levels.len() {
            return Err(Error::invalid_arg(
                "repetition_levels",
                format!(
                    "{} definition levels but {} repetition levels",
                    definition_levels.len(),
                    repetition_levels.len()
                ),
            ));
        }
        let mut values = values.into_iter();
        let mut entries = Vec::with_capacity(definition_levels.len());
        for (&definition_level, &repetition_level) in
            definition_levels.iter().zip(repetition_levels)
        {
            let value = if definition_level == max_definition_level {
                Some(values.next().ok_or_else(|| {
                    Error::invalid_arg("values", "fewer values than present entries")
                })?)
            } else {
                None
            };
            entries.push(LevelEntry {
                definition_level,
                repetition_level,
                value,
            });
        }
        if values.next().is_some() {
            return Err(Error::invalid_arg(
                "values",
                "more values than present entries",
            ));
        }
        Ok(LevelColumn::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> PeekableLevels for LevelColumn<T> {
    type Value = T;

    fn peek_levels(&self) -> Option<(i16, i16)> {
        self.entries
            .get(self.pos)
            .map(|e| (e.definition_level, e.repetition_level))
    }

    fn peek_value(&self) -> Option<&T> {
        self.entries.get(self.pos).and_then(|e| e.value.as_ref())
    }

    fn advance(&mut self) -> Result<()> {
        if self.pos >= self.entries.len() {
            return Err(Error::end_of_column());
        }
        self.pos += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnBatchOptions {
    /// Maximum number of records per batch.
    pub batch_size: usize,
}

impl Default for ColumnBatchOptions {
    fn default() -> Self {
        ColumnBatchOptions { batch_size: 1024 }
    }
}

impl ColumnBatchOptions {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// The part of one column covered by a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBatch<T> {
    /// One list per step of the column's repetition pattern.
    pub parent_indices: Vec<Vec<i64>>,
    /// Values of the present leaf entries.
    pub values: Vec<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatch<T> {
    pub columns: Vec<ColumnBatch<T>>,
    pub num_records: usize,
    /// Set when every column is exhausted after this batch.
    pub end_of_input: bool,
}

struct ColumnState<C> {
    column: C,
    builder: ParentIndicesBuilder,
}

/// Reads whole records from several level columns in lock step and turns
/// them into parent-index lists and values.
///
/// A record is an entry with repetition level 0 followed by every entry up
/// to the next one with repetition level 0. All columns must describe the
/// same records; a batch in which they disagree on the record count fails
/// with `Internal`.
pub struct ColumnBatchReader<C: PeekableLevels> {
    columns: Vec<ColumnState<C>>,
    options: ColumnBatchOptions,
    records_read: usize,
}

impl<C> ColumnBatchReader<C>
where
    C: PeekableLevels,
    C::Value: Clone,
{
    /// Pairs every column with its repetition pattern.
    pub fn new(
        columns: impl IntoIterator<Item = (C, RepetitionPattern)>,
        options: ColumnBatchOptions,
    ) -> Result<ColumnBatchReader<C>> {
        verify_arg!(batch_size, options.batch_size > 0);
        let columns = columns
            .into_iter()
            .map(|(column, pattern)| ColumnState {
                column,
                builder: ParentIndicesBuilder::new(pattern),
            })
            .collect::<Vec<_>>();
        if columns.is_empty() {
            return Err(Error::invalid_arg("columns", "at least one column is required"));
        }
        Ok(ColumnBatchReader {
            columns,
            options,
            records_read: 0,
        })
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Total number of records returned so far.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    pub fn is_at_end(&self) -> bool {
        self.columns
            .iter()
            .all(|state| state.column.peek_levels().is_none())
    }

    /// Reads up to `batch_size` records from every column.
    pub fn read_batch(&mut self) -> Result<RecordBatch<C::Value>> {
        let batch_size = self.options.batch_size;
        let mut columns = Vec::with_capacity(self.columns.len());
        let mut num_records = None;
        for (index, state) in self.columns.iter_mut().enumerate() {
            let (batch, records) = read_column(state, batch_size)?;
            match num_records {
                None => num_records = Some(records),
                Some(expected) if expected != records => {
                    return Err(Error::internal(format!(
                        "column {index} has {records} records in this batch, expected {expected}"
                    )));
                }
                Some(_) => {}
            }
            columns.push(batch);
        }
        let num_records = num_records.unwrap_or(0);
        self.records_read += num_records;
        Ok(RecordBatch {
            columns,
            num_records,
            end_of_input: self.is_at_end(),
        })
    }
}

fn read_column<C>(state: &mut ColumnState<C>, batch_size: usize) -> Result<(ColumnBatch<C::Value>, usize)>
where
    C: PeekableLevels,
    C::Value: Clone,
{
    state.builder.reset();
    let mut values = Vec::new();
    let mut records = 0;
    while records < batch_size {
        let Some((def, rep)) = state.column.peek_levels() else {
            break;
        };
        // The first entry of a record opens it whatever its repetition level.
        consume_entry(state, &mut values, def, rep)?;
        while let Some((def, rep)) = state.column.peek_levels() {
            if rep == 0 {
                break;
            }
            consume_entry(state, &mut values, def, rep)?;
        }
        records += 1;
    }
    Ok((
        ColumnBatch {
            parent_indices: state.builder.take(),
            values,
        },
        records,
    ))
}

fn consume_entry<C>(
    state: &mut ColumnState<C>,
    values: &mut Vec<C::Value>,
    definition_level: i16,
    repetition_level: i16,
) -> Result<()>
where
    C: PeekableLevels,
    C::Value: Clone,
{
    state.builder.add(definition_level, repetition_level)?;
    if let Some(value) = state.column.peek_value() {
        values.push(value.clone());
    }
    state.column.advance()
}
