use arrow_array::{Array, cast::AsArray, types::UInt32Type};
use strand_arrow::{ArrowColumnSink, decoder_schema};
use strand_proto::{DecodeOptions, FieldSpec, MapDecoderConfig, MapEntryCollector, SparseDecoder};
use strand_testkit::MessageBuilder;
use strand_wire::FieldKind;

#[test]
fn test_decoded_batch_to_record_batch() {
    let messages = [
        MessageBuilder::new()
            .uint32(1, 7)
            .string(2, "a")
            .string(2, "b")
            .build(),
        MessageBuilder::new().string(2, "c").build(),
        MessageBuilder::new().uint32(1, 9).build(),
    ];
    let decoder = SparseDecoder::new(
        [
            FieldSpec::new(1, FieldKind::UInt32),
            FieldSpec::repeated(2, FieldKind::String),
        ],
        DecodeOptions::default(),
    )
    .unwrap();
    let decoded = decoder.decode(messages.iter().map(Vec::as_slice)).unwrap();
    let num_messages = decoded.num_messages();

    let mut sink = ArrowColumnSink::new(decoder.num_fields());
    decoded.emit(&mut sink).unwrap();
    let batch = sink.into_record_batch(&["id", "tags"], num_messages).unwrap();
    assert_eq!(batch.num_rows(), 3);
    assert_eq!(
        batch.schema().as_ref(),
        &decoder_schema(&decoder, &["id", "tags"]).unwrap()
    );

    let ids = batch.column(0).as_list::<i64>();
    assert_eq!(ids.value(0).as_primitive::<UInt32Type>().value(0), 7);
    assert!(ids.value(1).is_empty());

    let tags = batch.column(1).as_list::<i64>();
    assert_eq!(tags.value_offsets(), &[0, 2, 3, 3]);
    let first = tags.value(0);
    let first = first.as_binary::<i64>();
    assert_eq!(first.value(1), b"b");
}

#[test]
fn test_map_columns_to_arrow() {
    let entries = [
        MessageBuilder::new().int32(1, 1).double(2, 0.5).build(),
        MessageBuilder::new().int32(1, 2).double(2, 1.5).build(),
    ];
    let entries = entries.iter().map(Vec::as_slice).collect::<Vec<_>>();
    let collector = MapEntryCollector::new(&MapDecoderConfig::new(
        FieldKind::Int32,
        FieldKind::Double,
        ["2"],
    ))
    .unwrap();
    let mut sink = ArrowColumnSink::new(collector.num_keys());
    collector.decode_into(&entries, &[0, 1], &mut sink).unwrap();
    let columns = sink.finish().unwrap();
    assert_eq!(columns[0].values.len(), 1);
    assert_eq!(columns[0].parent_indices.value(0), 1);
}
