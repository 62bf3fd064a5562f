//! Conversion of parent indices into list offsets.

use std::sync::Arc;

use arrow_array::{Array, ArrayRef, LargeListArray};
use arrow_buffer::{OffsetBuffer, ScalarBuffer};
use strand_common::{Result, error::Error};

use crate::data_types::item_field;

/// Converts a non-decreasing parent-index column into the offsets of one
/// list per parent, with `num_parents` lists in total. Parents without
/// values get empty lists.
///
/// ```
/// use strand_arrow::parent_indices_to_offsets;
///
/// let offsets = parent_indices_to_offsets(&[0, 0, 2], 4).unwrap();
/// assert_eq!(offsets.to_vec(), vec![0, 2, 2, 3, 3]);
/// ```
///
/// # Errors
///
/// `InvalidArgument` if the indices decrease or a parent index is not
/// below `num_parents`.
pub fn parent_indices_to_offsets(
    parent_indices: &[i64],
    num_parents: usize,
) -> Result<OffsetBuffer<i64>> {
    let mut offsets = Vec::with_capacity(num_parents + 1);
    offsets.push(0i64);
    let mut previous = 0i64;
    for (position, &parent) in parent_indices.iter().enumerate() {
        if parent < previous || parent as u64 >= num_parents as u64 {
            return Err(Error::invalid_arg(
                "parent_indices",
                format!(
                    "parent index {parent} at {position} is decreasing or not below {num_parents}"
                ),
            ));
        }
        // Close the lists of every parent up to this one.
        while offsets.len() <= parent as usize {
            offsets.push(position as i64);
        }
        previous = parent;
    }
    offsets.resize(num_parents + 1, parent_indices.len() as i64);
    Ok(OffsetBuffer::new(ScalarBuffer::from(offsets)))
}

/// Regroups `values` into one list per parent.
pub fn into_list_array(
    values: ArrayRef,
    parent_indices: &[i64],
    num_parents: usize,
) -> Result<LargeListArray> {
    if values.len() != parent_indices.len() {
        return Err(Error::invalid_arg(
            "parent_indices",
            format!(
                "{} parent indices for {} values",
                parent_indices.len(),
                values.len()
            ),
        ));
    }
    let offsets = parent_indices_to_offsets(parent_indices, num_parents)?;
    let field = Arc::new(item_field(values.data_type().clone()));
    LargeListArray::try_new(field, offsets, values, None)
        .map_err(|e| Error::arrow("new list array", e))
}

#[cfg(test)]
mod tests {
    use arrow_array::{Int64Array, cast::AsArray, types::Int64Type};

    use super::*;

    #[test]
    fn test_offsets() {
        assert_eq!(parent_indices_to_offsets(&[], 2).unwrap().to_vec(), vec![0, 0, 0]);
        assert_eq!(parent_indices_to_offsets(&[], 0).unwrap().to_vec(), vec![0]);
        assert_eq!(
            parent_indices_to_offsets(&[1, 1, 1], 2).unwrap().to_vec(),
            vec![0, 0, 3]
        );
        assert!(parent_indices_to_offsets(&[1, 0], 2).is_err());
        assert!(parent_indices_to_offsets(&[2], 2).is_err());
        assert!(parent_indices_to_offsets(&[-1], 2).is_err());
    }

    #[test]
    fn test_list_array() {
        let values: ArrayRef = Arc::new(Int64Array::from(vec![10, 11, 12]));
        let list = into_list_array(values, &[0, 2, 2], 3).unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.value(1).is_empty());
        assert_eq!(
            list.value(2).as_primitive::<Int64Type>().values().to_vec(),
            vec![11, 12]
        );

        let values: ArrayRef = Arc::new(Int64Array::from(vec![1]));
        assert!(into_list_array(values, &[0, 0], 1).is_err());
    }
}
