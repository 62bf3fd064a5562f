//! Random data generation and temporary input files.

use std::io::Write;

use crate::message::{MessageBuilder, length_delimited};

/// Generates a non-decreasing sequence of `len` values in `0..=max_value`,
/// with runs of equal values.
pub fn sorted_values(rng: &mut fastrand::Rng, len: usize, max_value: i64) -> Vec<i64> {
    let mut values = (0..len)
        .map(|_| rng.i64(0..=max_value))
        .collect::<Vec<_>>();
    values.sort_unstable();
    values
}

/// A randomly generated message together with the values it carries for
/// a repeated `int64` field and an optional `string` field. `labels` holds
/// every occurrence of the string field in insertion order; a decoder keeps
/// the last one.
#[derive(Debug, Clone)]
pub struct GeneratedMessage {
    pub builder: MessageBuilder,
    pub numbers: Vec<i64>,
    pub labels: Vec<String>,
}

/// Generates a message with `numbers_field` (repeated int64, unpacked),
/// `label_field` (optional string) and a few unrelated fields interleaved.
pub fn generate_message(
    rng: &mut fastrand::Rng,
    numbers_field: u32,
    label_field: u32,
) -> GeneratedMessage {
    let mut builder = MessageBuilder::new();
    let mut numbers = Vec::new();
    let mut labels = Vec::new();
    let unrelated = numbers_field.max(label_field) + 1;
    for _ in 0..rng.usize(0..8) {
        match rng.u8(0..4) {
            0 | 1 => {
                let value = rng.i64(-1000..1000);
                builder = builder.int64(numbers_field, value);
                numbers.push(value);
            }
            2 => {
                let value = (0..rng.usize(0..6))
                    .map(|_| rng.alphanumeric())
                    .collect::<String>();
                builder = builder.string(label_field, &value);
                labels.push(value);
            }
            _ => {
                builder = builder.fixed64(unrelated, rng.u64(..));
            }
        }
    }
    GeneratedMessage {
        builder,
        numbers,
        labels,
    }
}

/// Writes `contents` to a new temporary file.
pub fn write_temp_file(contents: &[u8]) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(contents)?;
    file.flush()?;
    Ok(file)
}

/// Writes `messages` to a new temporary file, each preceded by its varint
/// length.
pub fn write_delimited_messages(messages: &[Vec<u8>]) -> anyhow::Result<tempfile::NamedTempFile> {
    write_temp_file(&length_delimited(messages))
}
