use strand_common::{Result, error::Error};

use crate::{
    varint,
    wire_type::{Tag, WireType},
};

/// A read position over a borrowed message buffer.
///
/// Every read is bounds-checked and fails with a `Corrupt` error instead of
/// reading past the end. Slices returned by the cursor borrow from the
/// underlying buffer with its full lifetime `'a`.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> ByteCursor<'a> {
        ByteCursor { buf, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the cursor back to a position previously returned by
    /// [`position`](Self::position).
    #[inline]
    pub fn reset_to(&mut self, pos: usize) {
        debug_assert!(pos <= self.buf.len());
        self.pos = pos.min(self.buf.len());
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    #[inline]
    pub fn remaining_slice(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Returns the buffer bytes in `start..self.position()`.
    #[inline]
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        &self.buf[start.min(self.pos)..self.pos]
    }

    #[inline]
    pub fn read_varint(&mut self) -> Result<u64> {
        let (value, len) = varint::decode_varint(self.remaining_slice())?;
        self.pos += len;
        Ok(value)
    }

    #[inline]
    pub fn read_varint32(&mut self) -> Result<u32> {
        let (value, len) = varint::decode_varint32(self.remaining_slice())?;
        self.pos += len;
        Ok(value)
    }

    #[inline]
    pub fn read_fixed32(&mut self) -> Result<u32> {
        let value = varint::decode_fixed32(self.remaining_slice())?;
        self.pos += 4;
        Ok(value)
    }

    #[inline]
    pub fn read_fixed64(&mut self) -> Result<u64> {
        let value = varint::decode_fixed64(self.remaining_slice())?;
        self.pos += 8;
        Ok(value)
    }

    #[inline]
    pub fn read_tag(&mut self) -> Result<Tag> {
        let raw = self.read_varint32()?;
        Tag::from_raw(raw)
    }

    /// Reads a varint length prefix followed by that many bytes.
    #[inline]
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint32()? as usize;
        if len > self.remaining() {
            return Err(Error::corrupt(
                "length-delimited",
                format!(
                    "declared length {len} exceeds remaining {} bytes",
                    self.remaining()
                ),
            ));
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..self.pos])
    }

    /// Skips the group whose START_GROUP tag has just been read and returns
    /// its contents, excluding the terminating END_GROUP tag.
    ///
    /// Nested groups are tracked with a depth counter, so arbitrarily deep
    /// nesting does not consume stack. The field numbers of END_GROUP tags
    /// are not matched against their openers.
    pub fn skip_group(&mut self) -> Result<&'a [u8]> {
        let start = self.pos;
        let mut depth = 1usize;
        loop {
            if self.is_at_end() {
                return Err(Error::corrupt("group", "missing END_GROUP tag"));
            }
            let tag_start = self.pos;
            let tag = self.read_tag()?;
            match tag.wire_type {
                WireType::StartGroup => depth += 1,
                WireType::EndGroup => {
                    // Any END_GROUP closes the innermost open group.
                    depth -= 1;
                    if depth == 0 {
                        return Ok(&self.buf[start..tag_start]);
                    }
                }
                WireType::Varint => self.skip_varint()?,
                WireType::Fixed64 => self.skip_bytes(8, "fixed64")?,
                WireType::Fixed32 => self.skip_bytes(4, "fixed32")?,
                WireType::LengthDelimited => {
                    self.read_length_delimited()?;
                }
            }
        }
    }

    /// Skips the payload of a field whose tag has just been read.
    ///
    /// An END_GROUP payload is empty.
    pub fn skip_field(&mut self, wire_type: WireType) -> Result<()> {
        match wire_type {
            WireType::Varint => self.skip_varint(),
            WireType::Fixed64 => self.skip_bytes(8, "fixed64"),
            WireType::Fixed32 => self.skip_bytes(4, "fixed32"),
            WireType::LengthDelimited => self.read_length_delimited().map(|_| ()),
            WireType::StartGroup => self.skip_group().map(|_| ()),
            WireType::EndGroup => Ok(()),
        }
    }

    #[inline]
    fn skip_varint(&mut self) -> Result<()> {
        let len = varint::varint_len(self.remaining_slice())?;
        self.pos += len;
        Ok(())
    }

    #[inline]
    fn skip_bytes(&mut self, len: usize, context: &str) -> Result<()> {
        if len > self.remaining() {
            return Err(Error::corrupt(context, "unexpected end of input"));
        }
        self.pos += len;
        Ok(())
    }
}
