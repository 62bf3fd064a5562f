use serde::{Deserialize, Serialize};

use crate::wire_type::WireType;

/// Declared protobuf type of a field.
///
/// The kind determines the wire type a well-formed occurrence uses, how the
/// raw wire bits are interpreted, and which [`ValueType`] the decoded value
/// has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Double,
    Float,
    Int64,
    #[serde(rename = "uint64")]
    UInt64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Group,
    Message,
    Bytes,
    #[serde(rename = "uint32")]
    UInt32,
    Enum,
    #[serde(rename = "sfixed32")]
    SFixed32,
    #[serde(rename = "sfixed64")]
    SFixed64,
    #[serde(rename = "sint32")]
    SInt32,
    #[serde(rename = "sint64")]
    SInt64,
}

impl FieldKind {
    pub const ALL: [FieldKind; 18] = [
        FieldKind::Double,
        FieldKind::Float,
        FieldKind::Int64,
        FieldKind::UInt64,
        FieldKind::Int32,
        FieldKind::Fixed64,
        FieldKind::Fixed32,
        FieldKind::Bool,
        FieldKind::String,
        FieldKind::Group,
        FieldKind::Message,
        FieldKind::Bytes,
        FieldKind::UInt32,
        FieldKind::Enum,
        FieldKind::SFixed32,
        FieldKind::SFixed64,
        FieldKind::SInt32,
        FieldKind::SInt64,
    ];

    /// Wire type of a non-packed occurrence of this kind.
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldKind::Int32
            | FieldKind::Int64
            | FieldKind::UInt32
            | FieldKind::UInt64
            | FieldKind::SInt32
            | FieldKind::SInt64
            | FieldKind::Bool
            | FieldKind::Enum => WireType::Varint,
            FieldKind::Fixed32 | FieldKind::SFixed32 | FieldKind::Float => WireType::Fixed32,
            FieldKind::Fixed64 | FieldKind::SFixed64 | FieldKind::Double => WireType::Fixed64,
            FieldKind::String | FieldKind::Bytes | FieldKind::Message => {
                WireType::LengthDelimited
            }
            FieldKind::Group => WireType::StartGroup,
        }
    }

    /// Returns `true` if repeated occurrences may be packed into a single
    /// length-delimited payload.
    pub fn is_packable(&self) -> bool {
        !matches!(
            self,
            FieldKind::String | FieldKind::Bytes | FieldKind::Message | FieldKind::Group
        )
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            FieldKind::Double => ValueType::Double,
            FieldKind::Float => ValueType::Float,
            FieldKind::Int64 | FieldKind::SFixed64 | FieldKind::SInt64 => ValueType::Int64,
            FieldKind::UInt64 | FieldKind::Fixed64 => ValueType::UInt64,
            FieldKind::Int32 | FieldKind::Enum | FieldKind::SFixed32 | FieldKind::SInt32 => {
                ValueType::Int32
            }
            FieldKind::UInt32 | FieldKind::Fixed32 => ValueType::UInt32,
            FieldKind::Bool => ValueType::Bool,
            FieldKind::String | FieldKind::Bytes | FieldKind::Message | FieldKind::Group => {
                ValueType::Bytes
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Double => "double",
            FieldKind::Float => "float",
            FieldKind::Int64 => "int64",
            FieldKind::UInt64 => "uint64",
            FieldKind::Int32 => "int32",
            FieldKind::Fixed64 => "fixed64",
            FieldKind::Fixed32 => "fixed32",
            FieldKind::Bool => "bool",
            FieldKind::String => "string",
            FieldKind::Group => "group",
            FieldKind::Message => "message",
            FieldKind::Bytes => "bytes",
            FieldKind::UInt32 => "uint32",
            FieldKind::Enum => "enum",
            FieldKind::SFixed32 => "sfixed32",
            FieldKind::SFixed64 => "sfixed64",
            FieldKind::SInt32 => "sint32",
            FieldKind::SInt64 => "sint64",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldKind {
    type Err = strand_common::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                strand_common::error::Error::invalid_arg(
                    "field_kind",
                    format!("unknown field kind '{s}'"),
                )
            })
    }
}

/// In-memory representation of decoded values.
///
/// `Bytes` covers string, bytes, message and group fields; the collected
/// value is the raw payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Bool,
    Int32,
    #[serde(rename = "uint32")]
    UInt32,
    Int64,
    #[serde(rename = "uint64")]
    UInt64,
    Float,
    Double,
    Bytes,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValueType::Bool => "bool",
            ValueType::Int32 => "int32",
            ValueType::UInt32 => "uint32",
            ValueType::Int64 => "int64",
            ValueType::UInt64 => "uint64",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Bytes => "bytes",
        };
        f.write_str(s)
    }
}
