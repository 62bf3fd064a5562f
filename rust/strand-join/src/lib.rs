//! Index alignment of sorted integer columns, such as the parent-index
//! columns produced for sibling fields.

pub mod join;
pub mod run_length;

pub use join::{JoinIndices, equi_join_any_indices, equi_join_indices};
pub use run_length::run_length_before;
