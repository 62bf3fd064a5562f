use strand_common::{Result, error::Error};

use crate::{
    cursor::ByteCursor,
    field_kind::FieldKind,
    packed::PackedValues,
    value::{DecodeFn, WireValue},
    wire_type::{Tag, WireType},
};

/// Tag-by-tag pull parser over one serialized message.
///
/// [`next_field`](Self::next_field) returns the number of the next field
/// occurrence. Its payload may be read at most once with one of the `read_*`
/// methods; if it is not read, the following `next_field` call skips it.
///
/// ```
/// use strand_wire::{FieldKind, WireReader};
///
/// // field 1 = 150 (varint), field 2 = "hi"
/// let data = [0x08, 0x96, 0x01, 0x12, 0x02, b'h', b'i'];
/// let mut reader = WireReader::new(&data);
/// assert_eq!(reader.next_field().unwrap(), Some(1));
/// assert_eq!(reader.read_value::<u32>(FieldKind::UInt32).unwrap(), 150);
/// assert_eq!(reader.next_field().unwrap(), Some(2));
/// assert_eq!(reader.next_field().unwrap(), None);
/// ```
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    cursor: ByteCursor<'a>,
    wire_type: WireType,
    /// `true` between `next_field` and the read (or skip) of that field's payload.
    pending: bool,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> WireReader<'a> {
        WireReader {
            cursor: ByteCursor::new(buf),
            wire_type: WireType::Varint,
            pending: false,
        }
    }

    /// Creates a reader positioned as if a tag with `wire_type` had just
    /// been read and `payload` were the bytes following it.
    ///
    /// Used to hand an extracted field payload (for example a message-set
    /// item's length-prefixed message) to a collector expecting a reader.
    pub fn with_pending_field(payload: &'a [u8], wire_type: WireType) -> WireReader<'a> {
        WireReader {
            cursor: ByteCursor::new(payload),
            wire_type,
            pending: true,
        }
    }

    /// Advances to the next field occurrence, skipping the payload of the
    /// current one if it was not read. Returns `None` at the end of the
    /// buffer.
    pub fn next_field(&mut self) -> Result<Option<u32>> {
        Ok(self.next_tag()?.map(|tag| tag.field_number))
    }

    /// Same as [`next_field`](Self::next_field), returning the full tag.
    pub fn next_tag(&mut self) -> Result<Option<Tag>> {
        if self.pending {
            self.cursor.skip_field(self.wire_type)?;
            self.pending = false;
        }
        if self.cursor.is_at_end() {
            return Ok(None);
        }
        let tag = self.cursor.read_tag()?;
        self.wire_type = tag.wire_type;
        self.pending = true;
        Ok(Some(tag))
    }

    /// Wire type of the most recently returned field.
    #[inline]
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        !self.pending && self.cursor.is_at_end()
    }

    /// Returns `true` if the current field's payload has not been read yet.
    #[inline]
    pub fn has_pending_value(&self) -> bool {
        self.pending
    }

    /// Decodes the current field's payload as a value of `kind`.
    ///
    /// Fails with `Corrupt` if the field's wire type is not the one `kind`
    /// uses or the payload is malformed, in which case the reader position
    /// is left unchanged. Reading the same payload twice is an `Internal`
    /// error, and asking for a value type `kind` does not produce is an
    /// `InvalidArgument` error.
    pub fn read_value<T: WireValue<'a>>(&mut self, kind: FieldKind) -> Result<T> {
        let decode = T::decoder(kind).ok_or_else(|| {
            Error::invalid_arg(
                "kind",
                format!("{kind} fields do not produce {} values", T::VALUE_TYPE),
            )
        })?;
        if self.wire_type != kind.wire_type() {
            return Err(Error::corrupt(
                "field",
                format!(
                    "wire type {} does not match {kind} field",
                    self.wire_type
                ),
            ));
        }
        self.read_with(decode)
    }

    /// Decodes the current field's payload with a pre-resolved decode
    /// function. The caller is responsible for matching the wire type.
    #[inline]
    pub fn read_with<T>(&mut self, decode: DecodeFn<'a, T>) -> Result<T> {
        if !self.pending {
            return Err(Error::internal(
                "field payload was already consumed or no field is current",
            ));
        }
        let start = self.cursor.position();
        match decode(&mut self.cursor) {
            Ok(value) => {
                self.pending = false;
                Ok(value)
            }
            Err(e) => {
                self.cursor.reset_to(start);
                Err(e)
            }
        }
    }

    /// Reads the current field as a packed run of `kind` values.
    ///
    /// The field must be length-delimited and `kind` packable.
    pub fn read_packed<T: WireValue<'a>>(
        &mut self,
        kind: FieldKind,
    ) -> Result<PackedValues<'a, T>> {
        if self.wire_type != WireType::LengthDelimited {
            return Err(Error::corrupt(
                "packed field",
                format!("wire type {} is not length-delimited", self.wire_type),
            ));
        }
        let data = self.read_with(ByteCursor::read_length_delimited)?;
        PackedValues::new(data, kind)
    }

    /// Returns the undecoded payload of the current field: the varint bytes,
    /// the fixed-width bytes, the length prefix together with its data, or
    /// the group contents including the END_GROUP tag.
    pub fn read_raw(&mut self) -> Result<&'a [u8]> {
        if !self.pending {
            return Err(Error::internal(
                "field payload was already consumed or no field is current",
            ));
        }
        let start = self.cursor.position();
        let wire_type = self.wire_type;
        if let Err(e) = self.cursor.skip_field(wire_type) {
            self.cursor.reset_to(start);
            return Err(e);
        }
        self.pending = false;
        Ok(self.cursor.slice_from(start))
    }

    /// Skips the current field's payload.
    pub fn skip(&mut self) -> Result<()> {
        if self.pending {
            self.cursor.skip_field(self.wire_type)?;
            self.pending = false;
        }
        Ok(())
    }

    /// Remaining unread bytes, starting at the current position.
    pub fn remaining_slice(&self) -> &'a [u8] {
        self.cursor.remaining_slice()
    }
}
