//! Reconstruction of nesting from repetition and definition levels.
//!
//! Column stores that shred nested records keep, for every leaf value, a
//! definition level (how many of the optional or repeated ancestors are
//! present) and a repetition level (at which repeated ancestor the value
//! starts a new element). [`ParentIndicesBuilder`] turns these levels back
//! into parent-index lists, the same shape the wire decoders produce, and
//! [`ColumnBatchReader`] does so batch by batch over several columns.

pub mod column_reader;
pub mod parent_indices;
pub mod repetition;

pub use column_reader::{
    ColumnBatch, ColumnBatchOptions, ColumnBatchReader, LevelColumn, LevelEntry, PeekableLevels,
    RecordBatch,
};
pub use parent_indices::ParentIndicesBuilder;
pub use repetition::{RepetitionPattern, RepetitionType};
