//! The `(value type, field kind)` decode table.
//!
//! Each combination of an in-memory value type and a field kind that
//! produces it has exactly one decode function. Callers resolve the function
//! once per field through [`WireValue::decoder`] and then call it directly
//! for every occurrence, so there is no per-value dispatch on the kind.

use strand_common::Result;

use crate::{
    cursor::ByteCursor,
    field_kind::{FieldKind, ValueType},
    varint::{zigzag_decode32, zigzag_decode64},
};

/// Decodes one value from the cursor, which is positioned at the payload of
/// a field occurrence (just past its tag).
pub type DecodeFn<'a, T> = fn(&mut ByteCursor<'a>) -> Result<T>;

/// A value type that can be decoded from wire payloads.
pub trait WireValue<'a>: Copy + Sized + 'a {
    const VALUE_TYPE: ValueType;

    /// Returns the decode function for `kind`, or `None` if fields of that
    /// kind do not produce `Self`.
    fn decoder(kind: FieldKind) -> Option<DecodeFn<'a, Self>>;
}

impl<'a> WireValue<'a> for bool {
    const VALUE_TYPE: ValueType = ValueType::Bool;

    fn decoder(kind: FieldKind) -> Option<DecodeFn<'a, bool>> {
        let f: DecodeFn<'a, bool> = match kind {
            FieldKind::Bool => decode_bool as DecodeFn<'a, _>,
            _ => return None,
        };
        Some(f)
    }
}

impl<'a> WireValue<'a> for i32 {
    const VALUE_TYPE: ValueType = ValueType::Int32;

    fn decoder(kind: FieldKind) -> Option<DecodeFn<'a, i32>> {
        let f: DecodeFn<'a, i32> = match kind {
            FieldKind::Int32 | FieldKind::Enum => decode_int32 as DecodeFn<'a, _>,
            FieldKind::SInt32 => decode_sint32 as DecodeFn<'a, _>,
            FieldKind::SFixed32 => decode_sfixed32 as DecodeFn<'a, _>,
            _ => return None,
        };
        Some(f)
    }
}

impl<'a> WireValue<'a> for u32 {
    const VALUE_TYPE: ValueType = ValueType::UInt32;

    fn decoder(kind: FieldKind) -> Option<DecodeFn<'a, u32>> {
        let f: DecodeFn<'a, u32> = match kind {
            FieldKind::UInt32 => decode_uint32 as DecodeFn<'a, _>,
            FieldKind::Fixed32 => decode_fixed32 as DecodeFn<'a, _>,
            _ => return None,
        };
        Some(f)
    }
}

impl<'a> WireValue<'a> for i64 {
    const VALUE_TYPE: ValueType = ValueType::Int64;

    fn decoder(kind: FieldKind) -> Option<DecodeFn<'a, i64>> {
        let f: DecodeFn<'a, i64> = match kind {
            FieldKind::Int64 => decode_int64 as DecodeFn<'a, _>,
            FieldKind::SInt64 => decode_sint64 as DecodeFn<'a, _>,
            FieldKind::SFixed64 => decode_sfixed64 as DecodeFn<'a, _>,
            _ => return None,
        };
        Some(f)
    }
}

impl<'a> WireValue<'a> for u64 {
    const VALUE_TYPE: ValueType = ValueType::UInt64;

    fn decoder(kind: FieldKind) -> Option<DecodeFn<'a, u64>> {
        let f: DecodeFn<'a, u64> = match kind {
            FieldKind::UInt64 => decode_uint64 as DecodeFn<'a, _>,
            FieldKind::Fixed64 => decode_fixed64 as DecodeFn<'a, _>,
            _ => return None,
        };
        Some(f)
    }
}

impl<'a> WireValue<'a> for f32 {
    const VALUE_TYPE: ValueType = ValueType::Float;

    fn decoder(kind: FieldKind) -> Option<DecodeFn<'a, f32>> {
        let f: DecodeFn<'a, f32> = match kind {
            FieldKind::Float => decode_float as DecodeFn<'a, _>,
            _ => return None,
        };
        Some(f)
    }
}

impl<'a> WireValue<'a> for f64 {
    const VALUE_TYPE: ValueType = ValueType::Double;

    fn decoder(kind: FieldKind) -> Option<DecodeFn<'a, f64>> {
        let f: DecodeFn<'a, f64> = match kind {
            FieldKind::Double => decode_double as DecodeFn<'a, _>,
            _ => return None,
        };
        Some(f)
    }
}

impl<'a> WireValue<'a> for &'a [u8] {
    const VALUE_TYPE: ValueType = ValueType::Bytes;

    fn decoder(kind: FieldKind) -> Option<DecodeFn<'a, &'a [u8]>> {
        let f: DecodeFn<'a, &'a [u8]> = match kind {
            FieldKind::String | FieldKind::Bytes | FieldKind::Message => decode_bytes as DecodeFn<'a, _>,
            FieldKind::Group => decode_group as DecodeFn<'a, _>,
            _ => return None,
        };
        Some(f)
    }
}

fn decode_bool(cursor: &mut ByteCursor<'_>) -> Result<bool> {
    Ok(cursor.read_varint()? != 0)
}

fn decode_int32(cursor: &mut ByteCursor<'_>) -> Result<i32> {
    // Negative int32 values are sign-extended to ten bytes on the wire.
    Ok(cursor.read_varint()? as i32)
}

fn decode_sint32(cursor: &mut ByteCursor<'_>) -> Result<i32> {
    Ok(zigzag_decode32(cursor.read_varint()? as u32))
}

fn decode_sfixed32(cursor: &mut ByteCursor<'_>) -> Result<i32> {
    Ok(cursor.read_fixed32()? as i32)
}

fn decode_uint32(cursor: &mut ByteCursor<'_>) -> Result<u32> {
    Ok(cursor.read_varint()? as u32)
}

fn decode_fixed32(cursor: &mut ByteCursor<'_>) -> Result<u32> {
    cursor.read_fixed32()
}

fn decode_int64(cursor: &mut ByteCursor<'_>) -> Result<i64> {
    Ok(cursor.read_varint()? as i64)
}

fn decode_sint64(cursor: &mut ByteCursor<'_>) -> Result<i64> {
    Ok(zigzag_decode64(cursor.read_varint()?))
}

fn decode_sfixed64(cursor: &mut ByteCursor<'_>) -> Result<i64> {
    Ok(cursor.read_fixed64()? as i64)
}

fn decode_uint64(cursor: &mut ByteCursor<'_>) -> Result<u64> {
    cursor.read_varint()
}

fn decode_fixed64(cursor: &mut ByteCursor<'_>) -> Result<u64> {
    cursor.read_fixed64()
}

fn decode_float(cursor: &mut ByteCursor<'_>) -> Result<f32> {
    Ok(f32::from_bits(cursor.read_fixed32()?))
}

fn decode_double(cursor: &mut ByteCursor<'_>) -> Result<f64> {
    Ok(f64::from_bits(cursor.read_fixed64()?))
}

fn decode_bytes<'a>(cursor: &mut ByteCursor<'a>) -> Result<&'a [u8]> {
    cursor.read_length_delimited()
}

fn decode_group<'a>(cursor: &mut ByteCursor<'a>) -> Result<&'a [u8]> {
    cursor.skip_group()
}

/// Returns `true` if `kind` produces values of type `T`.
pub fn produces<'a, T: WireValue<'a>>(kind: FieldKind) -> bool {
    kind.value_type() == T::VALUE_TYPE
}
