//! Conversion of collected columns into Arrow arrays.
//!
//! Numeric and boolean values move into the Arrow buffers without copying;
//! byte values, which are views into the decoded messages, are copied into
//! a `LargeBinaryArray`.

use std::sync::Arc;

use arrow_array::{
    ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, LargeBinaryArray,
    UInt32Array, UInt64Array,
};
use strand_common::Result;
use strand_proto::{CollectedColumn, ColumnValues};

/// Trait for converting a type into an Arrow [`ArrayRef`].
pub trait IntoArrowArray {
    /// Converts `self` into an Arrow [`ArrayRef`].
    ///
    /// # Errors
    ///
    /// Returns an error if the Arrow array cannot be built.
    fn into_arrow_array(self) -> Result<ArrayRef>;
}

impl IntoArrowArray for ColumnValues<'_> {
    fn into_arrow_array(self) -> Result<ArrayRef> {
        let array: ArrayRef = match self {
            ColumnValues::Bool(values) => Arc::new(BooleanArray::from(values)),
            ColumnValues::Int32(values) => Arc::new(Int32Array::from(values)),
            ColumnValues::UInt32(values) => Arc::new(UInt32Array::from(values)),
            ColumnValues::Int64(values) => Arc::new(Int64Array::from(values)),
            ColumnValues::UInt64(values) => Arc::new(UInt64Array::from(values)),
            ColumnValues::Float(values) => Arc::new(Float32Array::from(values)),
            ColumnValues::Double(values) => Arc::new(Float64Array::from(values)),
            ColumnValues::Bytes(values) => Arc::new(LargeBinaryArray::from_iter_values(values)),
            ColumnValues::OwnedBytes(values) => {
                Arc::new(LargeBinaryArray::from_iter_values(values))
            }
        };
        Ok(array)
    }
}

/// Converts a collected column into its values array and its parent-index
/// array.
pub fn column_to_arrays(column: CollectedColumn<'_>) -> Result<(ArrayRef, Int64Array)> {
    let values = column.values.into_arrow_array()?;
    Ok((values, Int64Array::from(column.parent_indices)))
}
