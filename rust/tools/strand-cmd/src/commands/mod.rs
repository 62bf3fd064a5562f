//! Command implementations for strand-cmd

use std::path::Path;

use anyhow::{Context, Result};
use strand_wire::ByteCursor;

pub mod decode;
pub mod inspect;
pub mod levels;

/// Reads a whole input file.
pub fn read_input(path: &str) -> Result<Vec<u8>> {
    let file_path = Path::new(path);
    if !file_path.is_file() {
        anyhow::bail!("Not a file: {}", path);
    }
    std::fs::read(file_path).with_context(|| format!("Failed to read {path}"))
}

/// Splits a buffer of messages, each preceded by its varint length.
pub fn split_delimited(buf: &[u8]) -> Result<Vec<&[u8]>> {
    let mut cursor = ByteCursor::new(buf);
    let mut messages = Vec::new();
    while !cursor.is_at_end() {
        let offset = cursor.position();
        let message = cursor
            .read_length_delimited()
            .with_context(|| format!("Malformed message length at offset {offset}"))?;
        messages.push(message);
    }
    Ok(messages)
}
