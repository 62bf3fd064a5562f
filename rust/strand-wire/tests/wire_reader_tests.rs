use prost::Message;
use strand_testkit::MessageBuilder;
use strand_wire::{FieldKind, MessageSetItem, Tag, WireReader, WireType};

#[derive(Clone, PartialEq, prost::Message)]
struct Sample {
    #[prost(int32, tag = "1")]
    small: i32,
    #[prost(sint64, tag = "2")]
    signed: i64,
    #[prost(double, tag = "3")]
    ratio: f64,
    #[prost(string, tag = "4")]
    name: String,
    #[prost(fixed32, repeated, tag = "5")]
    fixed: Vec<u32>,
    #[prost(message, optional, tag = "6")]
    child: Option<Child>,
}

#[derive(Clone, PartialEq, prost::Message)]
struct Child {
    #[prost(bool, tag = "1")]
    flag: bool,
}

#[test]
fn test_reads_prost_encoded_message() {
    let sample = Sample {
        small: -7,
        signed: -300,
        ratio: 2.5,
        name: "wire".to_string(),
        fixed: vec![1, 2, 3],
        child: Some(Child { flag: true }),
    };
    let bytes = sample.encode_to_vec();

    let mut reader = WireReader::new(&bytes);
    let mut seen = Vec::new();
    while let Some(field) = reader.next_field().unwrap() {
        seen.push(field);
        match field {
            1 => assert_eq!(reader.read_value::<i32>(FieldKind::Int32).unwrap(), -7),
            2 => assert_eq!(reader.read_value::<i64>(FieldKind::SInt64).unwrap(), -300),
            3 => assert_eq!(reader.read_value::<f64>(FieldKind::Double).unwrap(), 2.5),
            4 => {
                let name: &[u8] = reader.read_value(FieldKind::String).unwrap();
                assert_eq!(name, b"wire");
            }
            5 => {
                assert_eq!(reader.wire_type(), WireType::LengthDelimited);
                let values = reader
                    .read_packed::<u32>(FieldKind::Fixed32)
                    .unwrap()
                    .collect::<strand_common::Result<Vec<_>>>()
                    .unwrap();
                assert_eq!(values, vec![1, 2, 3]);
            }
            6 => {
                let child: &[u8] = reader.read_value(FieldKind::Message).unwrap();
                let mut sub = WireReader::new(child);
                assert_eq!(sub.next_field().unwrap(), Some(1));
                assert!(sub.read_value::<bool>(FieldKind::Bool).unwrap());
                assert_eq!(sub.next_field().unwrap(), None);
            }
            _ => unreachable!(),
        }
    }
    assert_eq!(seen, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_skipping_every_field_reaches_end() {
    let bytes = MessageBuilder::new()
        .uint64(1, u64::MAX)
        .fixed64(2, 9)
        .group(3, &MessageBuilder::new().group(4, &MessageBuilder::new().string(5, "x")))
        .float(6, 1.0)
        .bytes(7, &[0; 300])
        .build();
    let mut reader = WireReader::new(&bytes);
    let mut tags = Vec::new();
    while let Some(tag) = reader.next_tag().unwrap() {
        tags.push(tag);
    }
    assert_eq!(
        tags,
        vec![
            Tag::new(1, WireType::Varint),
            Tag::new(2, WireType::Fixed64),
            Tag::new(3, WireType::StartGroup),
            Tag::new(6, WireType::Fixed32),
            Tag::new(7, WireType::LengthDelimited),
        ]
    );
}

#[test]
fn test_truncation_never_panics() {
    let bytes = MessageBuilder::new()
        .uint64(1, 1 << 40)
        .string(2, "some text")
        .group(3, &MessageBuilder::new().double(1, 0.5))
        .sfixed32(4, -1)
        .build();
    for len in 0..bytes.len() {
        let mut reader = WireReader::new(&bytes[..len]);
        let mut result = Ok(());
        loop {
            match reader.next_field() {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        // Every strict prefix ends inside some field except at field boundaries.
        if let Err(e) = result {
            assert!(e.is_corrupt());
        }
    }
}

#[test]
fn test_message_set_item_from_builder() {
    let payload = MessageBuilder::new().int32(1, 12);
    let bytes = MessageBuilder::new().message_set_item(100, &payload).build();
    let mut reader = WireReader::new(&bytes);
    assert_eq!(
        reader.next_tag().unwrap(),
        Some(Tag::new(1, WireType::StartGroup))
    );
    let contents: &[u8] = reader.read_value(FieldKind::Group).unwrap();
    let item = MessageSetItem::parse(contents).unwrap();
    assert_eq!(item.type_id, 100);
    assert_eq!(item.message().unwrap(), payload.build());

    let mut sub = item.message_reader();
    let message: &[u8] = sub.read_value(FieldKind::Message).unwrap();
    assert_eq!(message, payload.build());
    assert!(reader.is_at_end());
}

#[test]
fn test_packed_fixed64_and_pending_payload() {
    let bytes = MessageBuilder::new()
        .packed_fixed64(1, [u64::MAX, 0, 42])
        .sfixed64(2, -5)
        .build();
    let mut reader = WireReader::new(&bytes);
    assert!(!reader.has_pending_value());

    assert_eq!(reader.next_field().unwrap(), Some(1));
    assert!(reader.has_pending_value());
    let values = reader
        .read_packed::<u64>(FieldKind::Fixed64)
        .unwrap()
        .collect::<strand_common::Result<Vec<_>>>()
        .unwrap();
    assert_eq!(values, vec![u64::MAX, 0, 42]);
    assert!(!reader.has_pending_value());

    // Left unread, the payload is skipped by the next call.
    assert_eq!(reader.next_field().unwrap(), Some(2));
    assert!(reader.has_pending_value());
    assert_eq!(reader.next_field().unwrap(), None);
    assert!(reader.is_at_end());
}

fn read_sample(bytes: &[u8]) -> Sample {
    let mut sample = Sample::default();
    let mut reader = WireReader::new(bytes);
    while let Some(field) = reader.next_field().unwrap() {
        match field {
            1 => sample.small = reader.read_value(FieldKind::Int32).unwrap(),
            2 => sample.signed = reader.read_value(FieldKind::SInt64).unwrap(),
            3 => sample.ratio = reader.read_value(FieldKind::Double).unwrap(),
            4 => {
                let name: &[u8] = reader.read_value(FieldKind::String).unwrap();
                sample.name = String::from_utf8(name.to_vec()).unwrap();
            }
            5 if reader.wire_type() == WireType::LengthDelimited => {
                for value in reader.read_packed::<u32>(FieldKind::Fixed32).unwrap() {
                    sample.fixed.push(value.unwrap());
                }
            }
            5 => sample.fixed.push(reader.read_value(FieldKind::Fixed32).unwrap()),
            6 => {
                let child: &[u8] = reader.read_value(FieldKind::Message).unwrap();
                sample.child = Some(Child::decode(child).unwrap());
            }
            _ => {}
        }
    }
    sample
}

#[test]
fn test_shuffled_fields_match_prost() {
    let mut rng = fastrand::Rng::with_seed(31);
    for _ in 0..200 {
        let name = (0..rng.usize(0..12))
            .map(|_| rng.alphanumeric())
            .collect::<String>();
        let mut builder = MessageBuilder::new()
            .int32(1, rng.i32(..))
            .sint64(2, rng.i64(..))
            .double(3, rng.f64() * 1000.0)
            .string(4, &name)
            .message(6, &MessageBuilder::new().bool(1, rng.bool()))
            .uint32(9, rng.u32(..));
        if rng.bool() {
            builder = builder.packed_fixed32(5, (0..rng.usize(0..4)).map(|_| rng.u32(..)));
        }
        for _ in 0..rng.usize(0..3) {
            builder = builder.fixed32(5, rng.u32(..));
        }

        let bytes = builder.build_shuffled(&mut rng);
        let expected = Sample::decode(&bytes[..]).unwrap();
        assert_eq!(read_sample(&bytes), expected);
    }
}
