use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use strand_levels::{
    ColumnBatchOptions, ColumnBatchReader, LevelColumn, LevelEntry, ParentIndicesBuilder,
    RepetitionPattern,
};

pub fn run(pattern: String, levels: Vec<String>, batch_size: Option<usize>) -> Result<()> {
    let output = levels_to_json(&pattern, &levels, batch_size)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Converts the level pairs into parent indices, either in one piece or
/// batched by record.
pub fn levels_to_json(
    pattern: &str,
    levels: &[String],
    batch_size: Option<usize>,
) -> Result<Value> {
    let pattern = pattern
        .parse::<RepetitionPattern>()
        .with_context(|| format!("Invalid repetition pattern '{pattern}'"))?;
    let (definition_levels, repetition_levels) = parse_levels(levels)?;

    let Some(batch_size) = batch_size else {
        let mut builder = ParentIndicesBuilder::new(pattern);
        builder.add_levels(&definition_levels, &repetition_levels)?;
        return Ok(json!({ "parent_indices": builder.take() }));
    };

    let entries = definition_levels
        .iter()
        .zip(&repetition_levels)
        .map(|(&definition_level, &repetition_level)| LevelEntry::<()> {
            definition_level,
            repetition_level,
            value: None,
        })
        .collect::<Vec<_>>();
    let mut reader = ColumnBatchReader::new(
        [(LevelColumn::new(entries), pattern)],
        ColumnBatchOptions::default().with_batch_size(batch_size),
    )?;
    let mut batches = Vec::new();
    while !reader.is_at_end() {
        let batch = reader.read_batch()?;
        let parent_indices = batch
            .columns
            .into_iter()
            .next()
            .map(|column| column.parent_indices)
            .unwrap_or_default();
        batches.push(json!({
            "num_records": batch.num_records,
            "parent_indices": parent_indices,
        }));
    }
    Ok(json!({
        "num_records": reader.records_read(),
        "batches": batches,
    }))
}

/// Parses `definition:repetition` pairs.
fn parse_levels(levels: &[String]) -> Result<(Vec<i16>, Vec<i16>)> {
    let mut definition_levels = Vec::with_capacity(levels.len());
    let mut repetition_levels = Vec::with_capacity(levels.len());
    for pair in levels {
        let Some((def, rep)) = pair.split_once(':') else {
            bail!("Expected 'definition:repetition', got '{pair}'");
        };
        definition_levels.push(
            def.trim()
                .parse::<i16>()
                .with_context(|| format!("Invalid definition level in '{pair}'"))?,
        );
        repetition_levels.push(
            rep.trim()
                .parse::<i16>()
                .with_context(|| format!("Invalid repetition level in '{pair}'"))?,
        );
    }
    Ok((definition_levels, repetition_levels))
}
