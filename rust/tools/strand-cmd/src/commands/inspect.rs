use anyhow::{Context, Result};
use strand_wire::{FieldKind, WireReader, WireType};

use super::{read_input, split_delimited};

/// Longest string payload printed in full.
const MAX_PREVIEW_LEN: usize = 48;

pub fn run(count: usize, verbose: u8, file_path: String) -> Result<()> {
    let buf = read_input(&file_path)?;
    let messages = split_delimited(&buf)?;
    println!("{} messages in {}", messages.len(), file_path);
    for line in dump_messages(&messages, count, verbose)? {
        println!("{line}");
    }
    Ok(())
}

/// Renders the fields of the first `count` messages, one line per field.
pub fn dump_messages(messages: &[&[u8]], count: usize, verbose: u8) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for (index, message) in messages.iter().take(count).enumerate() {
        lines.push(format!("message {index} ({} bytes)", message.len()));
        dump_fields(message, 1, verbose, &mut lines)
            .with_context(|| format!("Malformed message {index}"))?;
    }
    Ok(lines)
}

fn dump_fields(buf: &[u8], depth: usize, verbose: u8, lines: &mut Vec<String>) -> Result<()> {
    let indent = "  ".repeat(depth);
    let mut reader = WireReader::new(buf);
    while let Some(tag) = reader.next_tag()? {
        let offset = reader.position();
        let prefix = format!("{indent}@{offset} field {} {}", tag.field_number, tag.wire_type);
        match tag.wire_type {
            WireType::Varint => {
                let value = reader.read_value::<u64>(FieldKind::UInt64)?;
                lines.push(format!("{prefix}: {value}"));
            }
            WireType::Fixed32 => {
                let value = reader.read_value::<u32>(FieldKind::Fixed32)?;
                lines.push(format!("{prefix}: {value:#010x}"));
            }
            WireType::Fixed64 => {
                let value = reader.read_value::<u64>(FieldKind::Fixed64)?;
                lines.push(format!("{prefix}: {value:#018x}"));
            }
            WireType::LengthDelimited => {
                let data = reader.read_value::<&[u8]>(FieldKind::Bytes)?;
                if verbose > 0 {
                    lines.push(format!("{prefix}: {}", preview(data)));
                } else {
                    lines.push(format!("{prefix}: {} bytes", data.len()));
                }
            }
            WireType::StartGroup => {
                let contents = reader.read_value::<&[u8]>(FieldKind::Group)?;
                lines.push(format!("{prefix}: {} bytes", contents.len()));
                dump_fields(contents, depth + 1, verbose, lines)?;
            }
            WireType::EndGroup => {
                reader.skip()?;
                lines.push(prefix);
            }
        }
    }
    Ok(())
}

fn preview(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(s) if s.len() <= MAX_PREVIEW_LEN => format!("{s:?}"),
        Ok(s) => {
            let end = (0..=MAX_PREVIEW_LEN)
                .rev()
                .find(|&i| s.is_char_boundary(i))
                .unwrap_or(0);
            format!("{:?}... ({} bytes)", &s[..end], data.len())
        }
        Err(_) => format!("{} bytes, not UTF-8", data.len()),
    }
}

#[cfg(test)]
mod tests {
    use strand_testkit::MessageBuilder;

    use super::*;

    #[test]
    fn test_dump_messages() {
        let message = MessageBuilder::new()
            .uint64(1, 300)
            .string(2, "hi")
            .group(3, &MessageBuilder::new().fixed32(4, 1))
            .build();
        let messages: [&[u8]; 2] = [&message, &[]];
        let lines = dump_messages(&messages, 5, 1).unwrap();
        assert_eq!(lines[0], format!("message 0 ({} bytes)", message.len()));
        assert!(lines[1].ends_with("field 1 varint: 300"));
        assert!(lines[2].ends_with("field 2 length_delimited: \"hi\""));
        assert!(lines[3].ends_with("field 3 start_group: 5 bytes"));
        assert!(lines[4].starts_with("    @"));
        assert!(lines[4].ends_with("field 4 fixed32: 0x00000001"));
        assert_eq!(lines[5], "message 1 (0 bytes)");
        assert_eq!(lines.len(), 6);

        let lines = dump_messages(&messages, 1, 0).unwrap();
        assert!(lines[2].ends_with("field 2 length_delimited: 2 bytes"));
    }

    #[test]
    fn test_malformed_message() {
        let truncated: [&[u8]; 1] = [&[0x08, 0x80]];
        assert!(dump_messages(&truncated, 1, 0).is_err());
        assert!(dump_messages(&truncated, 0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview(b"abc"), "\"abc\"");
        assert_eq!(preview(&[0xff]), "1 bytes, not UTF-8");
        let long = "x".repeat(60);
        assert!(preview(long.as_bytes()).ends_with("... (60 bytes)"));
    }
}
