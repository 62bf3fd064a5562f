//! Zero-copy pull parser for the protobuf wire format.
//!
//! The crate is organized bottom-up:
//! - [`varint`]: base-128 varints, little-endian fixed-width integers and zig-zag.
//! - [`cursor::ByteCursor`]: a bounds-checked position over a borrowed buffer,
//!   including the iterative (stack-free) group skip.
//! - [`field_kind::FieldKind`]: the declared protobuf type of a field and its
//!   mapping to a wire type and an in-memory value type.
//! - [`value::WireValue`]: the `(value type, field kind)` decode table,
//!   resolved once per field into a plain function pointer.
//! - [`reader::WireReader`]: the tag-by-tag pull interface.
//! - [`packed::PackedValues`] and [`message_set`]: packed repeated scalars and
//!   legacy message-set items.
//!
//! Every length-delimited value produced by this crate is a sub-slice of the
//! input buffer and therefore lives no longer than that buffer.

pub mod cursor;
pub mod field_kind;
pub mod message_set;
pub mod packed;
pub mod reader;
pub mod value;
pub mod varint;
pub mod wire_type;

pub use cursor::ByteCursor;
pub use field_kind::{FieldKind, ValueType};
pub use message_set::MessageSetItem;
pub use packed::PackedValues;
pub use reader::WireReader;
pub use value::{DecodeFn, WireValue};
pub use wire_type::{Tag, WireType};
