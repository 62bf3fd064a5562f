//! Field tags and wire types.

use strand_common::{Result, error::Error};

/// Largest field number representable in a tag.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Field number of a message-set item group.
pub const MESSAGE_SET_ITEM: u32 = 1;

/// Field number of the type id inside a message-set item.
pub const MESSAGE_SET_TYPE_ID: u32 = 2;

/// Field number of the payload inside a message-set item.
pub const MESSAGE_SET_MESSAGE: u32 = 3;

/// The low three bits of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    StartGroup = 3,
    EndGroup = 4,
    Fixed32 = 5,
}

impl WireType {
    /// Decodes the wire type bits of a tag, `None` for the reserved values 6 and 7.
    pub fn from_bits(bits: u32) -> Option<WireType> {
        match bits {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WireType::Varint => "varint",
            WireType::Fixed64 => "fixed64",
            WireType::LengthDelimited => "length_delimited",
            WireType::StartGroup => "start_group",
            WireType::EndGroup => "end_group",
            WireType::Fixed32 => "fixed32",
        }
    }
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    pub field_number: u32,
    pub wire_type: WireType,
}

impl Tag {
    pub fn new(field_number: u32, wire_type: WireType) -> Tag {
        Tag {
            field_number,
            wire_type,
        }
    }

    /// Splits a raw tag value. Field number 0 and the reserved wire types
    /// are rejected as corrupt.
    pub fn from_raw(raw: u32) -> Result<Tag> {
        let wire_type = WireType::from_bits(raw & 7).ok_or_else(|| {
            Error::corrupt("tag", format!("invalid wire type {} in tag {raw}", raw & 7))
        })?;
        let field_number = raw >> 3;
        if field_number == 0 {
            return Err(Error::corrupt("tag", "field number 0"));
        }
        Ok(Tag {
            field_number,
            wire_type,
        })
    }

    pub fn to_raw(&self) -> u32 {
        (self.field_number << 3) | self.wire_type as u32
    }

    /// Returns `true` for the tag that opens a message-set item.
    pub fn is_message_set_item(&self) -> bool {
        self.field_number == MESSAGE_SET_ITEM && self.wire_type == WireType::StartGroup
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_split() {
        let tag = Tag::from_raw((150 << 3) | 2).unwrap();
        assert_eq!(tag.field_number, 150);
        assert_eq!(tag.wire_type, WireType::LengthDelimited);
        assert_eq!(tag.to_raw(), (150 << 3) | 2);

        assert!(Tag::from_raw(2).unwrap_err().is_corrupt());
        assert!(Tag::from_raw((1 << 3) | 6).unwrap_err().is_corrupt());
        assert!(Tag::from_raw((1 << 3) | 7).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_message_set_item_tag() {
        assert!(Tag::from_raw(11).unwrap().is_message_set_item());
        assert!(!Tag::from_raw(12).unwrap().is_message_set_item());
        assert!(!Tag::from_raw((2 << 3) | 3).unwrap().is_message_set_item());
    }
}
