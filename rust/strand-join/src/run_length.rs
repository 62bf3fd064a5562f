/// For a non-decreasing column `a`, returns `b` with `b[n]` the number of
/// positions before `n` holding the value `a[n]`.
///
/// Applied to a parent-index column this yields the position of each value
/// within its parent, i.e. the second coordinate of a ragged array:
///
/// ```
/// use strand_join::run_length_before;
///
/// assert_eq!(run_length_before(&[0, 0, 2, 2, 2, 3]), vec![0, 1, 0, 1, 2, 0]);
/// ```
///
/// Only adjacent repeats are counted, so for unsorted input each run
/// restarts from 0.
pub fn run_length_before<T: PartialEq>(a: &[T]) -> Vec<i64> {
    let mut result = Vec::with_capacity(a.len());
    let mut run = 0i64;
    for (n, value) in a.iter().enumerate() {
        if n > 0 && a[n - 1] == *value {
            run += 1;
        } else {
            run = 0;
        }
        result.push(run);
    }
    result
}
