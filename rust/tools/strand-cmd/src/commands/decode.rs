use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strand_proto::{CollectedColumn, ColumnValues, DecodeOptions, FieldSpec, SparseDecoder};

use super::{read_input, split_delimited};

/// Fields to extract and the session options, as read from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeConfig {
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub options: DecodeOptions,
}

impl DecodeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<DecodeConfig> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid decode config {}", path.display()))
    }
}

pub fn run(config_path: String, file_path: String, pretty: bool) -> Result<()> {
    let config = DecodeConfig::load(&config_path)?;
    let buf = read_input(&file_path)?;
    let output = decode_to_json(&config, &buf)?;
    let text = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{text}");
    Ok(())
}

/// Decodes the length-delimited messages in `buf` and renders the columns
/// as JSON.
pub fn decode_to_json(config: &DecodeConfig, buf: &[u8]) -> Result<Value> {
    let decoder = SparseDecoder::new(config.fields.iter().copied(), config.options)
        .context("Invalid field configuration")?;
    let messages = split_delimited(buf)?;
    let batch = decoder
        .decode(messages.iter().copied())
        .context("Failed to decode messages")?;

    let columns = decoder
        .fields()
        .zip(batch.columns())
        .map(|(field, column)| {
            json!({
                "field": field.number,
                "kind": field.kind.as_str(),
                "values": values_to_json(column),
                "parent_indices": column.parent_indices,
            })
        })
        .collect::<Vec<_>>();

    Ok(json!({
        "num_messages": batch.num_messages(),
        "corrupt_messages": batch.corrupt_messages(),
        "columns": columns,
    }))
}

fn values_to_json(column: &CollectedColumn<'_>) -> Value {
    match &column.values {
        ColumnValues::Bool(v) => json!(v),
        ColumnValues::Int32(v) => json!(v),
        ColumnValues::UInt32(v) => json!(v),
        ColumnValues::Int64(v) => json!(v),
        ColumnValues::UInt64(v) => json!(v),
        ColumnValues::Float(v) => json!(v),
        ColumnValues::Double(v) => json!(v),
        ColumnValues::Bytes(v) => Value::Array(v.iter().map(|b| bytes_to_json(b)).collect()),
        ColumnValues::OwnedBytes(v) => Value::Array(v.iter().map(|b| bytes_to_json(b)).collect()),
    }
}

/// Valid UTF-8 prints as a string, anything else as an array of bytes.
fn bytes_to_json(bytes: &[u8]) -> Value {
    match std::str::from_utf8(bytes) {
        Ok(s) => Value::String(s.to_string()),
        Err(_) => json!(bytes),
    }
}

#[cfg(test)]
mod tests {
    use strand_proto::CorruptMessagePolicy;
    use strand_testkit::{
        MessageBuilder,
        data_gen::{write_delimited_messages, write_temp_file},
        message::length_delimited,
    };
    use strand_wire::FieldKind;

    use super::*;

    fn sample_input() -> Vec<u8> {
        length_delimited(&[
            MessageBuilder::new()
                .sint32(1, -4)
                .bytes(2, &[0xff, 0x00])
                .string(2, "tag")
                .build(),
            MessageBuilder::new().string(2, "other").build(),
        ])
    }

    #[test]
    fn test_decode_to_json() {
        let config = DecodeConfig {
            fields: vec![
                FieldSpec::new(1, FieldKind::SInt32),
                FieldSpec::repeated(2, FieldKind::Bytes).with_output(1),
            ],
            options: DecodeOptions::default(),
        };
        let output = decode_to_json(&config, &sample_input()).unwrap();
        assert_eq!(output["num_messages"], 2);
        assert_eq!(output["corrupt_messages"], 0);
        assert_eq!(output["columns"][0]["values"], json!([-4]));
        assert_eq!(output["columns"][0]["parent_indices"], json!([0]));
        assert_eq!(output["columns"][1]["kind"], "bytes");
        assert_eq!(
            output["columns"][1]["values"],
            json!([[255, 0], "tag", "other"])
        );
        assert_eq!(output["columns"][1]["parent_indices"], json!([0, 0, 1]));
    }

    #[test]
    fn test_skip_corrupt_messages() {
        let mut input = sample_input();
        // A message whose only field is truncated.
        input.extend_from_slice(&[0x02, 0x08, 0x80]);
        let config = DecodeConfig {
            fields: vec![FieldSpec::new(1, FieldKind::SInt32)],
            options: DecodeOptions::default().with_on_corrupt(CorruptMessagePolicy::Skip),
        };
        let output = decode_to_json(&config, &input).unwrap();
        assert_eq!(output["num_messages"], 3);
        assert_eq!(output["corrupt_messages"], 1);
        assert_eq!(output["columns"][0]["values"], json!([-4]));

        let config = DecodeConfig {
            options: DecodeOptions::default(),
            ..config
        };
        assert!(decode_to_json(&config, &input).is_err());
    }

    #[test]
    fn test_load_config() {
        let file = write_temp_file(
            br#"{
                "fields": [{"number": 5, "kind": "string", "repeated": true, "output": 0}],
                "options": {"message_set_items": true}
            }"#,
        )
        .unwrap();
        let config = DecodeConfig::load(file.path()).unwrap();
        assert_eq!(
            config.fields,
            vec![FieldSpec::repeated(5, FieldKind::String).with_output(0)]
        );
        assert!(config.options.message_set_items);

        let file = write_temp_file(b"{\"fields\": 3}").unwrap();
        assert!(DecodeConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_run_from_files() {
        let data = write_delimited_messages(&[MessageBuilder::new().bool(3, true).build()]).unwrap();
        let config =
            write_temp_file(br#"{"fields": [{"number": 3, "kind": "bool", "output": 0}]}"#)
                .unwrap();
        let path = |file: &tempfile::NamedTempFile| file.path().to_string_lossy().into_owned();
        run(path(&config), path(&data), true).unwrap();
        assert!(run(path(&config), "/nonexistent/input".to_string(), false).is_err());
    }
}
