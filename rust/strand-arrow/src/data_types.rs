use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema};
use strand_common::{Result, error::Error};
use strand_proto::SparseDecoder;
use strand_wire::ValueType;

/// Arrow type of the values array built for a column of `value_type`.
///
/// String, bytes and submessage values all become `LargeBinary`: the wire
/// format does not guarantee UTF-8 and the decoder does not validate it.
pub fn arrow_data_type(value_type: ValueType) -> DataType {
    match value_type {
        ValueType::Bool => DataType::Boolean,
        ValueType::Int32 => DataType::Int32,
        ValueType::UInt32 => DataType::UInt32,
        ValueType::Int64 => DataType::Int64,
        ValueType::UInt64 => DataType::UInt64,
        ValueType::Float => DataType::Float32,
        ValueType::Double => DataType::Float64,
        ValueType::Bytes => DataType::LargeBinary,
    }
}

/// Element field of the per-parent lists. Values are never null.
pub fn item_field(data_type: DataType) -> Field {
    Field::new("item", data_type, false)
}

/// A non-nullable `LargeList` field holding values of `data_type`.
pub fn list_field(name: &str, data_type: DataType) -> Field {
    Field::new(name, DataType::LargeList(Arc::new(item_field(data_type))), false)
}

/// Schema of the record batches built from the decoder's output, one list
/// column per requested field in output order.
pub fn decoder_schema<S: AsRef<str>>(decoder: &SparseDecoder, names: &[S]) -> Result<Schema> {
    if names.len() != decoder.num_fields() {
        return Err(Error::invalid_arg(
            "names",
            format!("{} names for {} fields", names.len(), decoder.num_fields()),
        ));
    }
    let fields = decoder
        .fields()
        .zip(names)
        .map(|(spec, name)| list_field(name.as_ref(), arrow_data_type(spec.kind.value_type())))
        .collect::<Vec<_>>();
    Ok(Schema::new(fields))
}
