use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, warn};
use strand_common::{Result, error::Error};

use crate::{
    collector::FieldCollector,
    column::CollectedColumn,
    dispatch::FieldDispatcher,
    field_spec::FieldSpec,
    options::{CorruptMessagePolicy, DecodeOptions},
    sink::ColumnSink,
};

/// Creates the collector of one field for each decode session and
/// remembers how large its columns have grown.
struct FieldFactory {
    spec: FieldSpec,
    /// Largest number of values produced for this field by any session so
    /// far. Only a capacity hint: concurrent sessions may race on it, and a
    /// stale value merely costs a reallocation.
    max_num_values: AtomicUsize,
}

impl FieldFactory {
    fn new(spec: FieldSpec) -> FieldFactory {
        FieldFactory {
            spec,
            max_num_values: AtomicUsize::new(0),
        }
    }

    fn create<'a>(&self) -> Result<FieldCollector<'a>> {
        FieldCollector::new(&self.spec, self.max_num_values.load(Ordering::Relaxed))
    }

    fn update_max_num_values(&self, num_values: usize) {
        if num_values > self.max_num_values.load(Ordering::Relaxed) {
            self.max_num_values.store(num_values, Ordering::Relaxed);
        }
    }
}

/// Decodes a fixed set of fields from batches of serialized messages.
///
/// The decoder is immutable after construction and may be shared between
/// threads; every [`decode`](Self::decode) call is an independent session
/// with its own collectors.
///
/// ```
/// use strand_proto::{ColumnValues, FieldSpec, SparseDecoder, DecodeOptions};
/// use strand_wire::FieldKind;
///
/// let decoder = SparseDecoder::new(
///     [FieldSpec::repeated(1, FieldKind::Int32)],
///     DecodeOptions::default(),
/// )
/// .unwrap();
/// // message 0: field 1 = 5, field 1 = 6; message 1: empty
/// let messages: [&[u8]; 2] = [&[0x08, 0x05, 0x08, 0x06], &[]];
/// let batch = decoder.decode(messages).unwrap();
/// let column = &batch.columns()[0];
/// assert_eq!(column.values, ColumnValues::Int32(vec![5, 6]));
/// assert_eq!(column.parent_indices, vec![0, 0]);
/// ```
pub struct SparseDecoder {
    /// Sorted by field number.
    factories: Vec<FieldFactory>,
    /// `output_order[slot]` is the factory index producing output `slot`.
    output_order: Vec<usize>,
    options: DecodeOptions,
}

impl SparseDecoder {
    /// Validates the field specs and builds the decoder.
    ///
    /// Field numbers must be unique and in range, the `output` slots must be
    /// a permutation of `0..fields.len()`, and every declared value type must
    /// match its field kind. A field without an `output` slot takes its
    /// position in `fields`.
    pub fn new(
        fields: impl IntoIterator<Item = FieldSpec>,
        options: DecodeOptions,
    ) -> Result<SparseDecoder> {
        // Unassigned output slots follow the order the fields are listed in.
        let mut specs = fields
            .into_iter()
            .enumerate()
            .map(|(position, spec)| (spec.output.unwrap_or(position), spec))
            .collect::<Vec<_>>();
        for (_, spec) in &specs {
            spec.validate()?;
        }
        specs.sort_by_key(|(_, spec)| spec.number);
        if let Some(w) = specs.windows(2).find(|w| w[0].1.number == w[1].1.number) {
            return Err(Error::invalid_arg(
                "fields",
                format!("field {} is requested more than once", w[0].1.number),
            ));
        }

        let mut output_order = vec![usize::MAX; specs.len()];
        for (i, &(output, spec)) in specs.iter().enumerate() {
            match output_order.get_mut(output) {
                Some(slot) if *slot == usize::MAX => *slot = i,
                Some(_) => {
                    return Err(Error::invalid_arg(
                        "output",
                        format!("output slot {output} is used more than once"),
                    ));
                }
                None => {
                    return Err(Error::invalid_arg(
                        "output",
                        format!(
                            "output slot {output} of field {} is out of range for {} fields",
                            spec.number,
                            specs.len()
                        ),
                    ));
                }
            }
        }

        Ok(SparseDecoder {
            factories: specs
                .into_iter()
                .map(|(output, spec)| FieldFactory::new(spec.with_output(output)))
                .collect(),
            output_order,
            options,
        })
    }

    /// Requested fields in output order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> + '_ {
        self.output_order.iter().map(|&i| &self.factories[i].spec)
    }

    pub fn num_fields(&self) -> usize {
        self.factories.len()
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decodes a batch of messages. The message at position `i` of the
    /// iteration has parent index `i` in every column.
    ///
    /// With [`CorruptMessagePolicy::Fail`] the first corrupt message fails
    /// the batch. With [`CorruptMessagePolicy::Skip`] it is logged, counted
    /// and contributes no values.
    pub fn decode<'a, I>(&self, messages: I) -> Result<DecodedBatch<'a>>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut collectors = self
            .factories
            .iter()
            .map(FieldFactory::create)
            .collect::<Result<Vec<_>>>()?;
        let mut dispatcher = FieldDispatcher::new(&mut collectors, self.options.message_set_items)?;

        let skip_corrupt = self.options.on_corrupt == CorruptMessagePolicy::Skip;
        let mut lengths = Vec::with_capacity(self.factories.len());
        let mut num_messages = 0usize;
        let mut corrupt_messages = 0usize;
        for message in messages {
            let index = num_messages as i64;
            num_messages += 1;
            if skip_corrupt {
                dispatcher.save_lengths(&mut lengths);
            }
            match dispatcher.consume_message(message, index) {
                Ok(()) => {}
                Err(e) if skip_corrupt && e.is_corrupt() => {
                    warn!("skipping corrupt message {index}: {e}");
                    dispatcher.restore_lengths(&lengths);
                    corrupt_messages += 1;
                }
                Err(e) => return Err(e),
            }
        }

        let mut produced = collectors
            .iter_mut()
            .zip(&self.factories)
            .map(|(collector, factory)| {
                factory.update_max_num_values(collector.len());
                Some(collector.produce(self.options.ownership))
            })
            .collect::<Vec<_>>();
        let columns = self
            .output_order
            .iter()
            .map(|&i| {
                produced[i]
                    .take()
                    .ok_or_else(|| Error::internal("output slot produced twice"))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "decoded {num_messages} messages ({corrupt_messages} corrupt), values per field: {:?}",
            self.fields()
                .zip(&columns)
                .map(|(spec, column)| (spec.number, column.len()))
                .collect::<Vec<_>>()
        );

        Ok(DecodedBatch {
            field_numbers: self.fields().map(|spec| spec.number).collect(),
            columns,
            num_messages,
            corrupt_messages,
        })
    }
}

/// Output of one decode session: one column per requested field, in
/// output-slot order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBatch<'a> {
    field_numbers: Vec<u32>,
    columns: Vec<CollectedColumn<'a>>,
    num_messages: usize,
    corrupt_messages: usize,
}

impl<'a> DecodedBatch<'a> {
    pub fn columns(&self) -> &[CollectedColumn<'a>] {
        &self.columns
    }

    pub fn column(&self, output: usize) -> Option<&CollectedColumn<'a>> {
        self.columns.get(output)
    }

    pub fn into_columns(self) -> Vec<CollectedColumn<'a>> {
        self.columns
    }

    /// Field number of the column at each output slot.
    pub fn field_numbers(&self) -> &[u32] {
        &self.field_numbers
    }

    /// Number of messages in the batch, including skipped corrupt ones.
    pub fn num_messages(&self) -> usize {
        self.num_messages
    }

    /// Number of corrupt messages that were skipped.
    pub fn corrupt_messages(&self) -> usize {
        self.corrupt_messages
    }

    pub fn into_owned(self) -> DecodedBatch<'static> {
        DecodedBatch {
            field_numbers: self.field_numbers,
            columns: self
                .columns
                .into_iter()
                .map(CollectedColumn::into_owned)
                .collect(),
            num_messages: self.num_messages,
            corrupt_messages: self.corrupt_messages,
        }
    }

    /// Hands every column to `sink`, in output-slot order.
    pub fn emit<S: ColumnSink<'a> + ?Sized>(self, sink: &mut S) -> Result<()> {
        for (output, column) in self.columns.into_iter().enumerate() {
            sink.accept(output, column)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use strand_common::error::ErrorKind;
    use strand_testkit::MessageBuilder;
    use strand_wire::FieldKind;

    use super::*;
    use crate::{column::ColumnValues, options::ValueOwnership};

    #[test]
    fn test_invalid_specs() {
        let dup = SparseDecoder::new(
            [
                FieldSpec::new(1, FieldKind::Int32).with_output(0),
                FieldSpec::new(1, FieldKind::Int64).with_output(1),
            ],
            DecodeOptions::default(),
        );
        assert!(matches!(
            dup.err().unwrap().kind(),
            ErrorKind::InvalidArgument { .. }
        ));

        let bad_slot = SparseDecoder::new(
            [
                FieldSpec::new(1, FieldKind::Int32).with_output(0),
                FieldSpec::new(2, FieldKind::Int64).with_output(0),
            ],
            DecodeOptions::default(),
        );
        assert!(bad_slot.is_err());

        let out_of_range = SparseDecoder::new(
            [FieldSpec::new(1, FieldKind::Int32).with_output(1)],
            DecodeOptions::default(),
        );
        assert!(out_of_range.is_err());
    }

    #[test]
    fn test_default_output_follows_listing_order() {
        let decoder = SparseDecoder::new(
            [
                FieldSpec::new(7, FieldKind::UInt32),
                FieldSpec::repeated(3, FieldKind::String),
            ],
            DecodeOptions::default(),
        )
        .unwrap();
        assert_eq!(
            decoder.fields().map(|f| f.number).collect::<Vec<_>>(),
            vec![7, 3]
        );
        let message = MessageBuilder::new()
            .string(3, "a")
            .uint32(7, 70)
            .string(3, "b")
            .build();
        let batch = decoder.decode([message.as_slice()]).unwrap();
        assert_eq!(batch.field_numbers(), &[7, 3]);
        assert_eq!(batch.columns()[0].values, ColumnValues::UInt32(vec![70]));
        assert_eq!(batch.columns()[1].len(), 2);

        // An explicit slot that collides with a default position is rejected.
        let clash = SparseDecoder::new(
            [
                FieldSpec::new(1, FieldKind::Int32),
                FieldSpec::new(2, FieldKind::Int32).with_output(0),
            ],
            DecodeOptions::default(),
        );
        assert!(clash.is_err());
    }

    #[test]
    fn test_output_order() {
        let decoder = SparseDecoder::new(
            [
                FieldSpec::new(9, FieldKind::String).with_output(0),
                FieldSpec::new(2, FieldKind::Bool).with_output(1),
            ],
            DecodeOptions::default(),
        )
        .unwrap();
        let message = MessageBuilder::new()
            .bool(2, true)
            .string(9, "x")
            .build();
        let batch = decoder.decode([message.as_slice()]).unwrap();
        assert_eq!(batch.field_numbers(), &[9, 2]);
        assert_eq!(batch.columns()[0].values.bytes_at(0), Some(&b"x"[..]));
        assert_eq!(batch.columns()[1].values, ColumnValues::Bool(vec![true]));
        assert_eq!(
            decoder.fields().map(|f| f.number).collect::<Vec<_>>(),
            vec![9, 2]
        );
    }

    #[test]
    fn test_corrupt_message_fails_batch() {
        let decoder =
            SparseDecoder::new([FieldSpec::new(1, FieldKind::Int32)], DecodeOptions::default())
                .unwrap();
        let good = MessageBuilder::new().int32(1, 1).build();
        let bad = MessageBuilder::new().raw(&[0x0a, 0x05, 1]).build();
        let err = decoder
            .decode([good.as_slice(), bad.as_slice()])
            .unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_corrupt_message_skipped_and_rolled_back() {
        let decoder = SparseDecoder::new(
            [FieldSpec::repeated(1, FieldKind::Int32)],
            DecodeOptions::default().with_on_corrupt(CorruptMessagePolicy::Skip),
        )
        .unwrap();
        let good = MessageBuilder::new().int32(1, 1).build();
        // Two values are committed before the truncated field is reached.
        let bad = MessageBuilder::new()
            .int32(1, 2)
            .int32(1, 3)
            .raw(&[0x12, 0x05, 1])
            .build();
        let batch = decoder
            .decode([good.as_slice(), bad.as_slice(), good.as_slice()])
            .unwrap();
        assert_eq!(batch.num_messages(), 3);
        assert_eq!(batch.corrupt_messages(), 1);
        let column = &batch.columns()[0];
        assert_eq!(column.values, ColumnValues::Int32(vec![1, 1]));
        assert_eq!(column.parent_indices, vec![0, 2]);
    }

    #[test]
    fn test_size_hint_grows() {
        let decoder =
            SparseDecoder::new([FieldSpec::repeated(1, FieldKind::Bool)], DecodeOptions::default())
                .unwrap();
        let message = MessageBuilder::new().bool(1, true).bool(1, false).build();
        decoder.decode([message.as_slice(); 3]).unwrap();
        assert_eq!(
            decoder.factories[0].max_num_values.load(Ordering::Relaxed),
            6
        );
        decoder.decode([message.as_slice()]).unwrap();
        assert_eq!(
            decoder.factories[0].max_num_values.load(Ordering::Relaxed),
            6
        );
    }

    #[test]
    fn test_owned_batch_outlives_input() {
        let decoder = SparseDecoder::new(
            [FieldSpec::new(3, FieldKind::Bytes)],
            DecodeOptions::default().with_ownership(ValueOwnership::Owned),
        )
        .unwrap();
        let batch = {
            let message = MessageBuilder::new().bytes(3, b"payload").build();
            decoder.decode([message.as_slice()]).unwrap().into_owned()
        };
        assert_eq!(
            batch.columns()[0].values,
            ColumnValues::OwnedBytes(vec![b"payload".to_vec()])
        );
    }

    #[test]
    fn test_emit_to_sink() {
        let decoder = SparseDecoder::new(
            [
                FieldSpec::new(1, FieldKind::UInt64).with_output(1),
                FieldSpec::new(2, FieldKind::Float).with_output(0),
            ],
            DecodeOptions::default(),
        )
        .unwrap();
        let message = MessageBuilder::new().uint64(1, 4).float(2, 0.5).build();
        let mut sink: Vec<(usize, CollectedColumn)> = Vec::new();
        decoder
            .decode([message.as_slice()])
            .unwrap()
            .emit(&mut sink)
            .unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].1.values, ColumnValues::Float(vec![0.5]));
        assert_eq!(sink[1].1.values, ColumnValues::UInt64(vec![4]));
    }
}
