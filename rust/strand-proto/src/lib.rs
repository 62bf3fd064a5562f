//! Sparse columnar extraction of fields from wire-format messages.
//!
//! A [`decoder::SparseDecoder`] is configured once with the fields of
//! interest ([`field_spec::FieldSpec`]) and then decodes batches of
//! serialized messages into one [`column::CollectedColumn`] per field: the
//! field's values in arrival order, each paired with the index of the
//! message it came from. Fields that were not requested are skipped without
//! being decoded.
//!
//! [`map_entry::MapEntryCollector`] does the same for map entries, routing
//! values into one column per configured key.
//!
//! String, bytes and submessage values are borrowed from the input buffers
//! unless [`options::ValueOwnership::Owned`] is requested.

pub mod collector;
pub mod column;
pub mod decoder;
pub mod dispatch;
pub mod field_spec;
pub mod map_entry;
pub mod options;
pub mod sink;

pub use column::{CollectedColumn, ColumnValues};
pub use decoder::{DecodedBatch, SparseDecoder};
pub use field_spec::FieldSpec;
pub use map_entry::{MapDecoderConfig, MapEntryCollector};
pub use options::{CorruptMessagePolicy, DecodeOptions, ValueOwnership};
pub use sink::ColumnSink;
