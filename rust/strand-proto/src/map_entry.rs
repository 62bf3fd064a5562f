//! Decoding of map entries into one column per requested key.
//!
//! A map field is serialized as a repeated submessage with the key in field
//! 1 and the value in field 2. [`MapEntryCollector`] is configured with the
//! keys of interest and routes each entry's value into the column of its
//! key; entries with other keys are dropped.

use std::{hash::Hash, str::FromStr};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use strand_common::{Result, error::Error};
use strand_wire::{DecodeFn, FieldKind, ValueType, WireReader, WireValue};

use crate::{
    column::{CollectedColumn, ColumnValues},
    options::ValueOwnership,
    sink::ColumnSink,
};

pub const KEY_FIELD_NUMBER: u32 = 1;
pub const VALUE_FIELD_NUMBER: u32 = 2;

/// Configuration of a [`MapEntryCollector`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDecoderConfig {
    pub key_kind: FieldKind,
    pub value_kind: FieldKind,
    /// Keys to extract, as literals: decimal integers, `"0"`/`"1"` for bool
    /// keys, or the string itself. Output column `i` holds the values of
    /// `keys[i]`.
    pub keys: Vec<String>,
    #[serde(default)]
    pub ownership: ValueOwnership,
}

impl MapDecoderConfig {
    pub fn new(
        key_kind: FieldKind,
        value_kind: FieldKind,
        keys: impl IntoIterator<Item = impl Into<String>>,
    ) -> MapDecoderConfig {
        MapDecoderConfig {
            key_kind,
            value_kind,
            keys: keys.into_iter().map(Into::into).collect(),
            ownership: ValueOwnership::Borrowed,
        }
    }

    pub fn with_ownership(mut self, ownership: ValueOwnership) -> Self {
        self.ownership = ownership;
        self
    }
}

/// Key literal to output slot.
struct KeySlots<K> {
    kind: FieldKind,
    slots: AHashMap<K, usize>,
}

impl<K: Eq + Hash> KeySlots<K> {
    /// Parses every literal up front. A literal listed twice maps to its
    /// last position, leaving the earlier slot empty.
    fn build(kind: FieldKind, keys: &[String], parse: impl Fn(&str) -> Result<K>) -> Result<Self> {
        let mut slots = AHashMap::with_capacity(keys.len());
        for (i, literal) in keys.iter().enumerate() {
            slots.insert(parse(literal)?, i);
        }
        Ok(KeySlots { kind, slots })
    }
}

fn parse_integer<T: FromStr>(literal: &str) -> Result<T> {
    literal.trim().parse().map_err(|_| {
        Error::invalid_arg(
            "keys",
            format!("failed to parse '{literal}' as an integer"),
        )
    })
}

fn parse_bool(literal: &str) -> Result<bool> {
    match literal {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(Error::invalid_arg(
            "keys",
            format!("failed to parse '{literal}' as a bool, expected '0' or '1'"),
        )),
    }
}

enum KeyDecoder {
    Int32(KeySlots<i32>),
    UInt32(KeySlots<u32>),
    Int64(KeySlots<i64>),
    UInt64(KeySlots<u64>),
    Bool(KeySlots<bool>),
    String(KeySlots<Vec<u8>>),
}

impl KeyDecoder {
    fn new(kind: FieldKind, keys: &[String]) -> Result<KeyDecoder> {
        Ok(match kind {
            FieldKind::Int32 | FieldKind::SInt32 | FieldKind::SFixed32 => {
                KeyDecoder::Int32(KeySlots::build(kind, keys, parse_integer)?)
            }
            FieldKind::UInt32 | FieldKind::Fixed32 => {
                KeyDecoder::UInt32(KeySlots::build(kind, keys, parse_integer)?)
            }
            FieldKind::Int64 | FieldKind::SInt64 | FieldKind::SFixed64 => {
                KeyDecoder::Int64(KeySlots::build(kind, keys, parse_integer)?)
            }
            FieldKind::UInt64 | FieldKind::Fixed64 => {
                KeyDecoder::UInt64(KeySlots::build(kind, keys, parse_integer)?)
            }
            FieldKind::Bool => KeyDecoder::Bool(KeySlots::build(kind, keys, parse_bool)?),
            FieldKind::String => KeyDecoder::String(KeySlots::build(kind, keys, |s| {
                Ok(s.as_bytes().to_vec())
            })?),
            _ => {
                return Err(Error::invalid_arg(
                    "key_kind",
                    format!("{kind} fields cannot be map keys"),
                ));
            }
        })
    }

    /// Reads the key the reader is positioned on and returns its slot, or
    /// `None` for a key that was not requested.
    fn decode(&self, reader: &mut WireReader<'_>) -> Result<Option<usize>> {
        let slot = match self {
            KeyDecoder::Int32(k) => k.slots.get(&reader.read_value::<i32>(k.kind)?),
            KeyDecoder::UInt32(k) => k.slots.get(&reader.read_value::<u32>(k.kind)?),
            KeyDecoder::Int64(k) => k.slots.get(&reader.read_value::<i64>(k.kind)?),
            KeyDecoder::UInt64(k) => k.slots.get(&reader.read_value::<u64>(k.kind)?),
            KeyDecoder::Bool(k) => k.slots.get(&reader.read_value::<bool>(k.kind)?),
            KeyDecoder::String(k) => k.slots.get(reader.read_value::<&[u8]>(k.kind)?),
        };
        Ok(slot.copied())
    }
}

/// Per-key value lists of one decode call, plus the value of the entry
/// being decoded.
struct SlotValues<'a, T> {
    kind: FieldKind,
    decode: DecodeFn<'a, T>,
    current: Option<T>,
    values: Vec<Vec<T>>,
    parent_indices: Vec<Vec<i64>>,
}

impl<'a, T: WireValue<'a>> SlotValues<'a, T> {
    fn new(kind: FieldKind, num_keys: usize) -> Result<Self> {
        let decode = T::decoder(kind).ok_or_else(|| {
            Error::internal(format!("no {} decoder for {kind}", T::VALUE_TYPE))
        })?;
        Ok(SlotValues {
            kind,
            decode,
            current: None,
            values: (0..num_keys).map(|_| Vec::new()).collect(),
            parent_indices: vec![Vec::new(); num_keys],
        })
    }

    fn consume(&mut self, reader: &mut WireReader<'a>) -> Result<()> {
        if reader.wire_type() != self.kind.wire_type() {
            return Err(Error::corrupt(
                "map entry",
                format!(
                    "value field has wire type {}, expected {}",
                    reader.wire_type(),
                    self.kind.wire_type()
                ),
            ));
        }
        self.current = Some(reader.read_with(self.decode)?);
        Ok(())
    }

    fn commit(&mut self, slot: usize, parent_index: i64) {
        if let Some(value) = self.current.take() {
            self.values[slot].push(value);
            self.parent_indices[slot].push(parent_index);
        }
    }

    fn reset(&mut self) {
        self.current = None;
    }

    fn into_columns(
        self,
        wrap: impl Fn(Vec<T>) -> ColumnValues<'a>,
    ) -> Vec<CollectedColumn<'a>> {
        self.values
            .into_iter()
            .zip(self.parent_indices)
            .map(|(values, parent_indices)| CollectedColumn::new(wrap(values), parent_indices))
            .collect()
    }
}

enum MapValues<'a> {
    Bool(SlotValues<'a, bool>),
    Int32(SlotValues<'a, i32>),
    UInt32(SlotValues<'a, u32>),
    Int64(SlotValues<'a, i64>),
    UInt64(SlotValues<'a, u64>),
    Float(SlotValues<'a, f32>),
    Double(SlotValues<'a, f64>),
    Bytes(SlotValues<'a, &'a [u8]>),
}

macro_rules! with_values {
    ($self:expr, $v:ident => $body:expr) => {
        match $self {
            MapValues::Bool($v) => $body,
            MapValues::Int32($v) => $body,
            MapValues::UInt32($v) => $body,
            MapValues::Int64($v) => $body,
            MapValues::UInt64($v) => $body,
            MapValues::Float($v) => $body,
            MapValues::Double($v) => $body,
            MapValues::Bytes($v) => $body,
        }
    };
}

impl<'a> MapValues<'a> {
    fn new(kind: FieldKind, num_keys: usize) -> Result<MapValues<'a>> {
        Ok(match kind.value_type() {
            ValueType::Bool => MapValues::Bool(SlotValues::new(kind, num_keys)?),
            ValueType::Int32 => MapValues::Int32(SlotValues::new(kind, num_keys)?),
            ValueType::UInt32 => MapValues::UInt32(SlotValues::new(kind, num_keys)?),
            ValueType::Int64 => MapValues::Int64(SlotValues::new(kind, num_keys)?),
            ValueType::UInt64 => MapValues::UInt64(SlotValues::new(kind, num_keys)?),
            ValueType::Float => MapValues::Float(SlotValues::new(kind, num_keys)?),
            ValueType::Double => MapValues::Double(SlotValues::new(kind, num_keys)?),
            ValueType::Bytes => MapValues::Bytes(SlotValues::new(kind, num_keys)?),
        })
    }

    fn consume(&mut self, reader: &mut WireReader<'a>) -> Result<()> {
        with_values!(self, v => v.consume(reader))
    }

    fn commit(&mut self, slot: usize, parent_index: i64) {
        with_values!(self, v => v.commit(slot, parent_index))
    }

    fn reset(&mut self) {
        with_values!(self, v => v.reset())
    }

    fn into_columns(self, ownership: ValueOwnership) -> Vec<CollectedColumn<'a>> {
        match self {
            MapValues::Bool(v) => v.into_columns(ColumnValues::Bool),
            MapValues::Int32(v) => v.into_columns(ColumnValues::Int32),
            MapValues::UInt32(v) => v.into_columns(ColumnValues::UInt32),
            MapValues::Int64(v) => v.into_columns(ColumnValues::Int64),
            MapValues::UInt64(v) => v.into_columns(ColumnValues::UInt64),
            MapValues::Float(v) => v.into_columns(ColumnValues::Float),
            MapValues::Double(v) => v.into_columns(ColumnValues::Double),
            MapValues::Bytes(v) => match ownership {
                ValueOwnership::Borrowed => v.into_columns(ColumnValues::Bytes),
                ValueOwnership::Owned => v.into_columns(|values| {
                    ColumnValues::OwnedBytes(values.into_iter().map(<[u8]>::to_vec).collect())
                }),
            },
        }
    }
}

/// Extracts the values of selected keys from serialized map entries.
///
/// The key table is built once and is read-only afterwards, so a collector
/// can be shared between threads; each [`decode`](Self::decode) call keeps
/// its values in call-local state.
///
/// ```
/// use strand_proto::{ColumnValues, MapDecoderConfig, MapEntryCollector};
/// use strand_wire::FieldKind;
///
/// let config = MapDecoderConfig::new(FieldKind::String, FieldKind::Int32, ["a", "b"]);
/// let collector = MapEntryCollector::new(&config).unwrap();
/// // {key: "b", value: 3}
/// let entry: &[u8] = &[0x0a, 0x01, b'b', 0x10, 0x03];
/// let columns = collector.decode(&[entry], &[0]).unwrap();
/// assert!(columns[0].is_empty());
/// assert_eq!(columns[1].values, ColumnValues::Int32(vec![3]));
/// ```
pub struct MapEntryCollector {
    key_decoder: KeyDecoder,
    value_kind: FieldKind,
    num_keys: usize,
    ownership: ValueOwnership,
}

impl MapEntryCollector {
    /// Validates the configuration and parses the key literals.
    pub fn new(config: &MapDecoderConfig) -> Result<MapEntryCollector> {
        if config.value_kind == FieldKind::Group {
            return Err(Error::invalid_arg(
                "value_kind",
                "group fields cannot be map values",
            ));
        }
        Ok(MapEntryCollector {
            key_decoder: KeyDecoder::new(config.key_kind, &config.keys)?,
            value_kind: config.value_kind,
            num_keys: config.keys.len(),
            ownership: config.ownership,
        })
    }

    pub fn num_keys(&self) -> usize {
        self.num_keys
    }

    pub fn value_type(&self) -> ValueType {
        self.value_kind.value_type()
    }

    /// Decodes `entries`, where `entries[i]` belongs to the parent
    /// `parent_indices[i]`, and returns one column per configured key.
    ///
    /// An entry without a key field is corrupt. An entry without a value
    /// field contributes nothing. When a field occurs more than once in an
    /// entry, the last occurrence counts.
    pub fn decode<'a>(
        &self,
        entries: &[&'a [u8]],
        parent_indices: &[i64],
    ) -> Result<Vec<CollectedColumn<'a>>> {
        if entries.len() != parent_indices.len() {
            return Err(Error::invalid_arg(
                "parent_indices",
                format!(
                    "{} parent indices for {} map entries",
                    parent_indices.len(),
                    entries.len()
                ),
            ));
        }
        let mut values = MapValues::new(self.value_kind, self.num_keys)?;
        for (&entry, &parent_index) in entries.iter().zip(parent_indices) {
            values.reset();
            let mut reader = WireReader::new(entry);
            let mut key_found = false;
            let mut slot = None;
            while let Some(number) = reader.next_field()? {
                match number {
                    KEY_FIELD_NUMBER => {
                        slot = self.key_decoder.decode(&mut reader).map_err(|e| {
                            Error::corrupt("map entry", format!("corrupted key field: {e}"))
                        })?;
                        key_found = true;
                    }
                    VALUE_FIELD_NUMBER => values.consume(&mut reader)?,
                    _ => {}
                }
            }
            if !key_found {
                return Err(Error::corrupt("map entry", "key field not found"));
            }
            if let Some(slot) = slot {
                values.commit(slot, parent_index);
            }
        }
        Ok(values.into_columns(self.ownership))
    }

    /// Same as [`decode`](Self::decode), handing column `i` to `sink` as
    /// output `i`.
    pub fn decode_into<'a, S: ColumnSink<'a> + ?Sized>(
        &self,
        entries: &[&'a [u8]],
        parent_indices: &[i64],
        sink: &mut S,
    ) -> Result<()> {
        for (output, column) in self.decode(entries, parent_indices)?.into_iter().enumerate() {
            sink.accept(output, column)?;
        }
        Ok(())
    }
}
