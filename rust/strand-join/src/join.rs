use strand_common::{Result, error::Error};

/// Matching positions of two columns: `a[left[k]] == b[right[k]]` for
/// every `k`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinIndices {
    pub left: Vec<usize>,
    pub right: Vec<usize>,
}

impl JoinIndices {
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.left.iter().copied().zip(self.right.iter().copied())
    }

    fn push(&mut self, i: usize, j: usize) {
        self.left.push(i);
        self.right.push(j);
    }
}

/// Joins two non-decreasing columns on equality.
///
/// Every pair `(i, j)` with `a[i] == b[j]` appears exactly once, ordered by
/// `i` and then by `j`. This is the alignment needed to broadcast values of
/// one field onto the occurrences of a sibling field sharing its parents.
///
/// ```
/// use strand_join::equi_join_indices;
///
/// let joined = equi_join_indices(&[1, 1, 2, 5], &[1, 2, 2, 6]).unwrap();
/// assert_eq!(
///     joined.pairs().collect::<Vec<_>>(),
///     [(0, 0), (1, 0), (2, 1), (2, 2)]
/// );
/// ```
///
/// # Errors
///
/// `InvalidArgument` if either column is not sorted.
pub fn equi_join_indices<T: Ord>(a: &[T], b: &[T]) -> Result<JoinIndices> {
    if !a.is_sorted() {
        return Err(Error::invalid_arg("a", "column is not sorted"));
    }
    if !b.is_sorted() {
        return Err(Error::invalid_arg("b", "column is not sorted"));
    }

    let mut result = JoinIndices::default();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                // `j` stays at the start of the run so that the next equal
                // `a[i]` matches the same run.
                let mut run = j;
                while run < b.len() && b[run] == a[i] {
                    result.push(i, run);
                    run += 1;
                }
                i += 1;
            }
        }
    }
    Ok(result)
}

/// Joins two columns in any order on equality by comparing every pair.
///
/// Produces the same pairs as [`equi_join_indices`] does for sorted input,
/// in the same order. Quadratic; meant for short or unsorted columns.
pub fn equi_join_any_indices<T: PartialEq>(a: &[T], b: &[T]) -> JoinIndices {
    let mut result = JoinIndices::default();
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            if x == y {
                result.push(i, j);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equi_join_example() {
        let a = [1i64, 1, 2, 5];
        let b = [1i64, 2, 2, 6];
        let sorted = equi_join_indices(&a, &b).unwrap();
        assert_eq!(sorted.left, vec![0, 1, 2, 2]);
        assert_eq!(sorted.right, vec![0, 0, 1, 2]);
        assert_eq!(equi_join_any_indices(&a, &b), sorted);
    }

    #[test]
    fn test_empty_and_disjoint() {
        assert!(equi_join_indices::<i64>(&[], &[1, 2]).unwrap().is_empty());
        assert!(equi_join_indices(&[1, 3, 5], &[2, 4, 6]).unwrap().is_empty());
        assert!(equi_join_any_indices(&[1, 3], &[2]).is_empty());
    }

    #[test]
    fn test_unsorted_rejected() {
        assert!(equi_join_indices(&[2, 1], &[1]).is_err());
        assert!(equi_join_indices(&[1], &[3, 2]).is_err());
        let any = equi_join_any_indices(&[2, 1, 2], &[1, 2]);
        assert_eq!(any.pairs().collect::<Vec<_>>(), [(0, 1), (1, 0), (2, 1)]);
    }
}
