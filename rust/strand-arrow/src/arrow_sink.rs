use std::sync::Arc;

use arrow_array::{Array, ArrayRef, Int64Array, RecordBatch};
use arrow_schema::Schema;
use strand_common::{Result, error::Error};
use strand_proto::{CollectedColumn, ColumnSink};

use crate::{column_to_array::column_to_arrays, data_types::list_field, list_offsets::into_list_array};

/// A decoded column as Arrow arrays.
#[derive(Debug, Clone)]
pub struct ArrowColumn {
    pub values: ArrayRef,
    pub parent_indices: Int64Array,
}

impl ArrowColumn {
    /// Regroups the values into one list per parent.
    pub fn to_list_array(&self, num_parents: usize) -> Result<ArrayRef> {
        let list = into_list_array(
            self.values.clone(),
            self.parent_indices.values(),
            num_parents,
        )?;
        Ok(Arc::new(list))
    }
}

/// Collects the columns of a decode session as Arrow arrays, indexed by
/// output slot.
#[derive(Debug, Default)]
pub struct ArrowColumnSink {
    columns: Vec<Option<ArrowColumn>>,
}

impl ArrowColumnSink {
    pub fn new(num_outputs: usize) -> ArrowColumnSink {
        ArrowColumnSink {
            columns: vec![None; num_outputs],
        }
    }

    /// Returns the columns in output order.
    ///
    /// # Errors
    ///
    /// `Internal` if an output slot never received a column.
    pub fn finish(self) -> Result<Vec<ArrowColumn>> {
        self.columns
            .into_iter()
            .enumerate()
            .map(|(output, column)| {
                column.ok_or_else(|| Error::internal(format!("output {output} was not produced")))
            })
            .collect()
    }

    /// Builds a record batch with one row per parent and one list column
    /// per output, named by `names`.
    pub fn into_record_batch<S: AsRef<str>>(
        self,
        names: &[S],
        num_parents: usize,
    ) -> Result<RecordBatch> {
        let columns = self.finish()?;
        if names.len() != columns.len() {
            return Err(Error::invalid_arg(
                "names",
                format!("{} names for {} columns", names.len(), columns.len()),
            ));
        }
        let mut fields = Vec::with_capacity(columns.len());
        let mut arrays = Vec::with_capacity(columns.len());
        for (name, column) in names.iter().zip(&columns) {
            let list = column.to_list_array(num_parents)?;
            fields.push(list_field(name.as_ref(), column.values.data_type().clone()));
            arrays.push(list);
        }
        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
            .map_err(|e| Error::arrow("new record batch", e))
    }
}

impl<'a> ColumnSink<'a> for ArrowColumnSink {
    fn accept(&mut self, output: usize, column: CollectedColumn<'a>) -> Result<()> {
        if output >= self.columns.len() {
            self.columns.resize(output + 1, None);
        }
        let (values, parent_indices) = column_to_arrays(column)?;
        self.columns[output] = Some(ArrowColumn {
            values,
            parent_indices,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use strand_proto::ColumnValues;

    use super::*;

    #[test]
    fn test_missing_output() {
        let mut sink = ArrowColumnSink::new(2);
        sink.accept(1, CollectedColumn::new(ColumnValues::Bool(vec![true]), vec![0]))
            .unwrap();
        assert!(sink.finish().is_err());
    }

    #[test]
    fn test_record_batch() {
        let mut sink = ArrowColumnSink::default();
        sink.accept(0, CollectedColumn::new(ColumnValues::Double(vec![0.5]), vec![1]))
            .unwrap();
        let batch = sink.into_record_batch(&["ratio"], 2).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(0).name(), "ratio");
        assert!(sink_names_mismatch().is_err());
    }

    fn sink_names_mismatch() -> Result<RecordBatch> {
        let mut sink = ArrowColumnSink::default();
        sink.accept(0, CollectedColumn::new(ColumnValues::Int32(vec![]), vec![]))?;
        sink.into_record_batch(&["a", "b"], 0)
    }
}
