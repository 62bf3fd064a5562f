//! Per-field typed value collectors.

use log::trace;
use strand_common::{Result, error::Error};
use strand_wire::{
    ByteCursor, DecodeFn, FieldKind, PackedValues, ValueType, WireReader, WireType, WireValue,
};

use crate::{
    column::{CollectedColumn, ColumnValues},
    field_spec::FieldSpec,
    options::ValueOwnership,
};

/// Collects the values of one field across the messages of a session.
///
/// The decode function for the field's kind is resolved once at
/// construction. Each consumed occurrence is stored together with its
/// parent index (the index of the message it was found in).
pub struct ValueCollector<'a, T> {
    number: u32,
    kind: FieldKind,
    repeated: bool,
    decode: DecodeFn<'a, T>,
    values: Vec<T>,
    parent_indices: Vec<i64>,
}

impl<'a, T: WireValue<'a>> ValueCollector<'a, T> {
    pub fn new(spec: &FieldSpec, capacity: usize) -> Result<ValueCollector<'a, T>> {
        let decode = T::decoder(spec.kind).ok_or_else(|| {
            Error::invalid_arg(
                "kind",
                format!(
                    "field {} of kind {} cannot be collected as {}",
                    spec.number,
                    spec.kind,
                    T::VALUE_TYPE
                ),
            )
        })?;
        Ok(ValueCollector {
            number: spec.number,
            kind: spec.kind,
            repeated: spec.repeated,
            decode,
            values: Vec::with_capacity(capacity),
            parent_indices: Vec::with_capacity(capacity),
        })
    }

    /// Decodes the occurrence the reader is positioned on and commits it
    /// under `parent_index`.
    ///
    /// An occurrence whose wire type differs from the one of the field's
    /// kind is read as a packed run if the kind is packable and the
    /// occurrence is length-delimited. Any other mismatch leaves the
    /// payload unread, so the reader skips it.
    pub fn consume(&mut self, reader: &mut WireReader<'a>, parent_index: i64) -> Result<()> {
        let wire_type = reader.wire_type();
        if wire_type == self.kind.wire_type() {
            let value = reader.read_with(self.decode)?;
            self.commit(value, parent_index);
        } else if self.kind.is_packable() && wire_type == WireType::LengthDelimited {
            let data = reader.read_with(ByteCursor::read_length_delimited)?;
            for value in PackedValues::with_decoder(data, self.decode) {
                self.commit(value?, parent_index);
            }
        } else {
            trace!(
                "skipping field {} occurrence with wire type {wire_type}, expected {}",
                self.number,
                self.kind.wire_type()
            );
        }
        Ok(())
    }
}

impl<'a, T> ValueCollector<'a, T> {
    pub fn field_number(&self) -> u32 {
        self.number
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Appends `value` under `parent_index`. For a singular field, a value
    /// already present for the same parent is replaced instead.
    #[inline]
    pub fn commit(&mut self, value: T, parent_index: i64) {
        if !self.repeated && self.parent_indices.last() == Some(&parent_index) {
            if let Some(last) = self.values.last_mut() {
                *last = value;
                return;
            }
        }
        self.values.push(value);
        self.parent_indices.push(parent_index);
    }

    /// Drops every value committed after the collector had `len` values.
    pub fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
        self.parent_indices.truncate(len);
    }

    /// Hands off the collected values and parent indices, leaving the
    /// collector empty.
    pub fn produce(&mut self) -> (Vec<T>, Vec<i64>) {
        (
            std::mem::take(&mut self.values),
            std::mem::take(&mut self.parent_indices),
        )
    }
}

/// A [`ValueCollector`] for any of the supported value types.
pub enum FieldCollector<'a> {
    Bool(ValueCollector<'a, bool>),
    Int32(ValueCollector<'a, i32>),
    UInt32(ValueCollector<'a, u32>),
    Int64(ValueCollector<'a, i64>),
    UInt64(ValueCollector<'a, u64>),
    Float(ValueCollector<'a, f32>),
    Double(ValueCollector<'a, f64>),
    Bytes(ValueCollector<'a, &'a [u8]>),
}

macro_rules! with_collector {
    ($self:expr, $c:ident => $body:expr) => {
        match $self {
            FieldCollector::Bool($c) => $body,
            FieldCollector::Int32($c) => $body,
            FieldCollector::UInt32($c) => $body,
            FieldCollector::Int64($c) => $body,
            FieldCollector::UInt64($c) => $body,
            FieldCollector::Float($c) => $body,
            FieldCollector::Double($c) => $body,
            FieldCollector::Bytes($c) => $body,
        }
    };
}

impl<'a> FieldCollector<'a> {
    /// Creates the collector matching the value type of `spec.kind`.
    pub fn new(spec: &FieldSpec, capacity: usize) -> Result<FieldCollector<'a>> {
        Ok(match spec.kind.value_type() {
            ValueType::Bool => FieldCollector::Bool(ValueCollector::new(spec, capacity)?),
            ValueType::Int32 => FieldCollector::Int32(ValueCollector::new(spec, capacity)?),
            ValueType::UInt32 => FieldCollector::UInt32(ValueCollector::new(spec, capacity)?),
            ValueType::Int64 => FieldCollector::Int64(ValueCollector::new(spec, capacity)?),
            ValueType::UInt64 => FieldCollector::UInt64(ValueCollector::new(spec, capacity)?),
            ValueType::Float => FieldCollector::Float(ValueCollector::new(spec, capacity)?),
            ValueType::Double => FieldCollector::Double(ValueCollector::new(spec, capacity)?),
            ValueType::Bytes => FieldCollector::Bytes(ValueCollector::new(spec, capacity)?),
        })
    }

    pub fn field_number(&self) -> u32 {
        with_collector!(self, c => c.field_number())
    }

    pub fn len(&self) -> usize {
        with_collector!(self, c => c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn consume(&mut self, reader: &mut WireReader<'a>, parent_index: i64) -> Result<()> {
        with_collector!(self, c => c.consume(reader, parent_index))
    }

    pub fn truncate(&mut self, len: usize) {
        with_collector!(self, c => c.truncate(len))
    }

    /// Hands off the collected column, copying byte values out of the input
    /// buffers if `ownership` is [`ValueOwnership::Owned`].
    pub fn produce(&mut self, ownership: ValueOwnership) -> CollectedColumn<'a> {
        let (values, parent_indices) = match self {
            FieldCollector::Bool(c) => wrap(c.produce(), ColumnValues::Bool),
            FieldCollector::Int32(c) => wrap(c.produce(), ColumnValues::Int32),
            FieldCollector::UInt32(c) => wrap(c.produce(), ColumnValues::UInt32),
            FieldCollector::Int64(c) => wrap(c.produce(), ColumnValues::Int64),
            FieldCollector::UInt64(c) => wrap(c.produce(), ColumnValues::UInt64),
            FieldCollector::Float(c) => wrap(c.produce(), ColumnValues::Float),
            FieldCollector::Double(c) => wrap(c.produce(), ColumnValues::Double),
            FieldCollector::Bytes(c) => {
                let (values, parent_indices) = c.produce();
                let values = match ownership {
                    ValueOwnership::Borrowed => ColumnValues::Bytes(values),
                    ValueOwnership::Owned => {
                        ColumnValues::OwnedBytes(values.into_iter().map(<[u8]>::to_vec).collect())
                    }
                };
                (values, parent_indices)
            }
        };
        CollectedColumn::new(values, parent_indices)
    }
}

fn wrap<'a, T>(
    (values, parent_indices): (Vec<T>, Vec<i64>),
    f: impl FnOnce(Vec<T>) -> ColumnValues<'a>,
) -> (ColumnValues<'a>, Vec<i64>) {
    (f(values), parent_indices)
}
