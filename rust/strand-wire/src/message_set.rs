//! Legacy message-set items.
//!
//! A message set is a message whose only field is a repeated group with
//! field number 1. Each group (an "item") carries a type id in field 2 and
//! the serialized extension message in field 3:
//!
//! ```text
//! repeated group Item = 1 {
//!   required uint32 type_id = 2;
//!   required bytes message = 3;
//! }
//! ```

use strand_common::{Result, error::Error};

use crate::{
    cursor::ByteCursor,
    field_kind::FieldKind,
    reader::WireReader,
    wire_type::{MESSAGE_SET_MESSAGE, MESSAGE_SET_TYPE_ID, WireType},
};

/// A parsed message-set item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSetItem<'a> {
    pub type_id: u32,
    /// The serialized message, including its varint length prefix.
    pub encoded_message: &'a [u8],
}

impl<'a> MessageSetItem<'a> {
    /// Parses the contents of an item group (the bytes between its
    /// START_GROUP and END_GROUP tags).
    ///
    /// The type id and message may appear in either order; when either one
    /// appears more than once the last occurrence wins. Any other tag,
    /// including a type id or message field with an unexpected wire type,
    /// is skipped. An item missing either part, or with a zero type id, is
    /// corrupt.
    pub fn parse(contents: &'a [u8]) -> Result<MessageSetItem<'a>> {
        let mut reader = WireReader::new(contents);
        let mut type_id = None;
        let mut encoded_message = None;
        while let Some(tag) = reader.next_tag()? {
            match (tag.field_number, tag.wire_type) {
                (MESSAGE_SET_TYPE_ID, WireType::Varint) => {
                    type_id = Some(reader.read_value::<u32>(FieldKind::UInt32)?);
                }
                (MESSAGE_SET_MESSAGE, WireType::LengthDelimited) => {
                    encoded_message = Some(reader.read_raw()?);
                }
                _ => {}
            }
        }
        match (type_id, encoded_message) {
            (Some(0), _) => Err(Error::corrupt("message set item", "type id 0")),
            (Some(type_id), Some(encoded_message)) => Ok(MessageSetItem {
                type_id,
                encoded_message,
            }),
            (None, _) => Err(Error::corrupt("message set item", "missing type id")),
            (_, None) => Err(Error::corrupt("message set item", "missing message")),
        }
    }

    /// The serialized message without its length prefix.
    pub fn message(&self) -> Result<&'a [u8]> {
        ByteCursor::new(self.encoded_message).read_length_delimited()
    }

    /// A reader positioned on the message as a pending length-delimited
    /// field, ready to be handed to a field collector.
    pub fn message_reader(&self) -> WireReader<'a> {
        WireReader::with_pending_field(self.encoded_message, WireType::LengthDelimited)
    }
}
