//! Materialization of collected columns as Apache Arrow arrays.
//!
//! This crate includes:
//! - The mapping of wire value types to Arrow data types and schemas
//!   (`data_types`).
//! - Conversion of collected values and parent indices to Arrow arrays
//!   (`column_to_array`).
//! - Conversion of parent indices to list offsets, to rebuild one list per
//!   parent (`list_offsets`).
//! - A [`ColumnSink`](strand_proto::ColumnSink) that gathers the columns of
//!   a decode session as Arrow arrays (`arrow_sink`).

pub mod arrow_sink;
pub mod column_to_array;
pub mod data_types;
pub mod list_offsets;

pub use arrow_sink::{ArrowColumn, ArrowColumnSink};
pub use column_to_array::IntoArrowArray;
pub use data_types::{arrow_data_type, decoder_schema};
pub use list_offsets::{into_list_array, parent_indices_to_offsets};
