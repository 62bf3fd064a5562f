//! Wire-format message builder.

use prost::encoding::{WireType, encode_key, encode_varint};

/// Builds a serialized message one field occurrence at a time.
///
/// Occurrences are kept separately until the message is finished, which
/// allows emitting them in insertion order, reversed, or shuffled.
///
/// ```
/// use strand_testkit::MessageBuilder;
///
/// let bytes = MessageBuilder::new()
///     .uint64(1, 150)
///     .string(2, "hi")
///     .build();
/// assert_eq!(bytes, [0x08, 0x96, 0x01, 0x12, 0x02, b'h', b'i']);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    fields: Vec<Vec<u8>>,
}

impl MessageBuilder {
    pub fn new() -> MessageBuilder {
        MessageBuilder::default()
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    fn push(mut self, field: Vec<u8>) -> Self {
        self.fields.push(field);
        self
    }

    fn with_key(field_number: u32, wire_type: WireType) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_key(field_number, wire_type, &mut buf);
        buf
    }

    /// Appends a varint field with the raw value.
    pub fn varint(self, field_number: u32, value: u64) -> Self {
        let mut buf = Self::with_key(field_number, WireType::Varint);
        encode_varint(value, &mut buf);
        self.push(buf)
    }

    /// `int32` values are sign-extended to 64 bits on the wire.
    pub fn int32(self, field_number: u32, value: i32) -> Self {
        self.varint(field_number, value as i64 as u64)
    }

    pub fn int64(self, field_number: u32, value: i64) -> Self {
        self.varint(field_number, value as u64)
    }

    pub fn uint32(self, field_number: u32, value: u32) -> Self {
        self.varint(field_number, value as u64)
    }

    pub fn uint64(self, field_number: u32, value: u64) -> Self {
        self.varint(field_number, value)
    }

    pub fn sint32(self, field_number: u32, value: i32) -> Self {
        self.varint(field_number, zigzag32(value) as u64)
    }

    pub fn sint64(self, field_number: u32, value: i64) -> Self {
        self.varint(field_number, zigzag64(value))
    }

    pub fn bool(self, field_number: u32, value: bool) -> Self {
        self.varint(field_number, value as u64)
    }

    pub fn fixed32(self, field_number: u32, value: u32) -> Self {
        let mut buf = Self::with_key(field_number, WireType::ThirtyTwoBit);
        buf.extend_from_slice(&value.to_le_bytes());
        self.push(buf)
    }

    pub fn fixed64(self, field_number: u32, value: u64) -> Self {
        let mut buf = Self::with_key(field_number, WireType::SixtyFourBit);
        buf.extend_from_slice(&value.to_le_bytes());
        self.push(buf)
    }

    pub fn sfixed32(self, field_number: u32, value: i32) -> Self {
        self.fixed32(field_number, value as u32)
    }

    pub fn sfixed64(self, field_number: u32, value: i64) -> Self {
        self.fixed64(field_number, value as u64)
    }

    pub fn float(self, field_number: u32, value: f32) -> Self {
        self.fixed32(field_number, value.to_bits())
    }

    pub fn double(self, field_number: u32, value: f64) -> Self {
        self.fixed64(field_number, value.to_bits())
    }

    pub fn bytes(self, field_number: u32, value: &[u8]) -> Self {
        let mut buf = Self::with_key(field_number, WireType::LengthDelimited);
        encode_varint(value.len() as u64, &mut buf);
        buf.extend_from_slice(value);
        self.push(buf)
    }

    pub fn string(self, field_number: u32, value: &str) -> Self {
        self.bytes(field_number, value.as_bytes())
    }

    /// Appends a nested message as a length-delimited field.
    pub fn message(self, field_number: u32, message: &MessageBuilder) -> Self {
        self.bytes(field_number, &message.build())
    }

    /// Appends a nested message as a group field.
    pub fn group(self, field_number: u32, contents: &MessageBuilder) -> Self {
        let mut buf = Self::with_key(field_number, WireType::StartGroup);
        buf.extend_from_slice(&contents.build());
        encode_key(field_number, WireType::EndGroup, &mut buf);
        self.push(buf)
    }

    /// Appends a packed run of raw varints.
    pub fn packed_varints(self, field_number: u32, values: impl IntoIterator<Item = u64>) -> Self {
        let mut payload = Vec::new();
        for value in values {
            encode_varint(value, &mut payload);
        }
        self.bytes(field_number, &payload)
    }

    /// Appends a packed run of 4-byte little-endian values.
    pub fn packed_fixed32(self, field_number: u32, values: impl IntoIterator<Item = u32>) -> Self {
        let payload = values
            .into_iter()
            .flat_map(|v| v.to_le_bytes())
            .collect::<Vec<_>>();
        self.bytes(field_number, &payload)
    }

    /// Appends a packed run of 8-byte little-endian values.
    pub fn packed_fixed64(self, field_number: u32, values: impl IntoIterator<Item = u64>) -> Self {
        let payload = values
            .into_iter()
            .flat_map(|v| v.to_le_bytes())
            .collect::<Vec<_>>();
        self.bytes(field_number, &payload)
    }

    /// Appends a message-set item group carrying `message` under `type_id`.
    pub fn message_set_item(self, type_id: u32, message: &MessageBuilder) -> Self {
        let item = MessageBuilder::new()
            .uint32(2, type_id)
            .message(3, message);
        self.group(1, &item)
    }

    /// Appends a bare tag without a payload.
    pub fn tag(self, field_number: u32, wire_type: WireType) -> Self {
        self.push(Self::with_key(field_number, wire_type))
    }

    /// Appends arbitrary bytes as one occurrence.
    pub fn raw(self, bytes: &[u8]) -> Self {
        self.push(bytes.to_vec())
    }

    /// Concatenates the occurrences in insertion order.
    pub fn build(&self) -> Vec<u8> {
        self.fields.concat()
    }

    /// Concatenates the occurrences in reverse insertion order.
    pub fn build_reversed(&self) -> Vec<u8> {
        self.fields.iter().rev().flatten().copied().collect()
    }

    /// Concatenates the occurrences in a random order.
    pub fn build_shuffled(&self, rng: &mut fastrand::Rng) -> Vec<u8> {
        let mut fields = self.fields.iter().collect::<Vec<_>>();
        rng.shuffle(&mut fields);
        fields.into_iter().flatten().copied().collect()
    }
}

fn zigzag32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

fn zigzag64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Concatenates messages, each preceded by its varint length.
pub fn length_delimited(messages: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = Vec::new();
    for message in messages {
        encode_varint(message.len() as u64, &mut buf);
        buf.extend_from_slice(message);
    }
    buf
}
