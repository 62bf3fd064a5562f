use strand_levels::{
    ColumnBatchOptions, ColumnBatchReader, LevelColumn, ParentIndicesBuilder, RepetitionPattern,
    RepetitionType::*,
};

/// Records of a list-of-lists column: `records[r][j][k]`.
type Records = Vec<Vec<Vec<i64>>>;

fn random_records(rng: &mut fastrand::Rng, num_records: usize) -> Records {
    (0..num_records)
        .map(|_| {
            (0..rng.usize(0..4))
                .map(|_| (0..rng.usize(0..4)).map(|_| rng.i64(..)).collect())
                .collect()
        })
        .collect()
}

/// Shreds records into (definition, repetition) levels and leaf values.
fn shred(records: &Records) -> (Vec<i16>, Vec<i16>, Vec<i64>) {
    let mut defs = Vec::new();
    let mut reps = Vec::new();
    let mut values = Vec::new();
    for record in records {
        if record.is_empty() {
            defs.push(0);
            reps.push(0);
            continue;
        }
        for (j, item) in record.iter().enumerate() {
            let item_rep = if j == 0 { 0 } else { 1 };
            if item.is_empty() {
                defs.push(1);
                reps.push(item_rep);
                continue;
            }
            for (k, &value) in item.iter().enumerate() {
                defs.push(2);
                reps.push(if k == 0 { item_rep } else { 2 });
                values.push(value);
            }
        }
    }
    (defs, reps, values)
}

fn expected_parent_indices(records: &Records) -> Vec<Vec<i64>> {
    let mut steps = vec![Vec::new(), Vec::new(), Vec::new()];
    let mut item_index = 0i64;
    for (r, record) in records.iter().enumerate() {
        steps[0].push(0);
        for item in record {
            steps[1].push(r as i64);
            steps[2].extend(std::iter::repeat_n(item_index, item.len()));
            item_index += 1;
        }
    }
    steps
}

#[test]
fn test_shredded_lists_round_trip() {
    let mut rng = fastrand::Rng::with_seed(11);
    let pattern = RepetitionPattern::new([Repeated, Repeated, Repeated]).unwrap();
    for _ in 0..100 {
        let num_records = rng.usize(1..30);
        let records = random_records(&mut rng, num_records);
        let (defs, reps, _) = shred(&records);
        let mut builder = ParentIndicesBuilder::new(pattern.clone());
        builder.add_levels(&defs, &reps).unwrap();
        assert_eq!(builder.parent_indices(), expected_parent_indices(&records));
    }
}

#[test]
fn test_parent_indices_point_into_parent_step() {
    let mut rng = fastrand::Rng::with_seed(5);
    let pattern = RepetitionPattern::new([Repeated, Repeated, Repeated]).unwrap();
    let records = random_records(&mut rng, 200);
    let (defs, reps, _) = shred(&records);
    let mut builder = ParentIndicesBuilder::new(pattern);
    for (&def, &rep) in defs.iter().zip(&reps) {
        builder.add(def, rep).unwrap();
        let steps = builder.parent_indices();
        for i in 1..steps.len() {
            assert!(
                steps[i]
                    .iter()
                    .all(|&p| p >= 0 && (p as usize) < steps[i - 1].len())
            );
            assert!(steps[i].windows(2).all(|w| w[0] <= w[1]));
        }
    }
}

#[test]
fn test_batched_reader_matches_single_pass() {
    let mut rng = fastrand::Rng::with_seed(23);
    let pattern = RepetitionPattern::new([Repeated, Repeated, Repeated]).unwrap();
    let records = random_records(&mut rng, 57);
    let (defs, reps, values) = shred(&records);

    // The second column holds the same shape with negated values.
    let first = LevelColumn::from_levels(&defs, &reps, values.clone(), 2).unwrap();
    let second =
        LevelColumn::from_levels(&defs, &reps, values.iter().map(|v| v.wrapping_neg()), 2).unwrap();
    let mut reader = ColumnBatchReader::new(
        [(first, pattern.clone()), (second, pattern)],
        ColumnBatchOptions::default().with_batch_size(10),
    )
    .unwrap();

    let mut collected = Vec::new();
    let mut batches = 0;
    loop {
        let batch = reader.read_batch().unwrap();
        batches += 1;
        let start = reader.records_read() - batch.num_records;
        let expected = expected_parent_indices(&records[start..reader.records_read()].to_vec());
        assert_eq!(batch.columns[0].parent_indices, expected);
        assert_eq!(batch.columns[1].parent_indices, expected);
        assert_eq!(
            batch.columns[1].values,
            batch.columns[0]
                .values
                .iter()
                .map(|v| v.wrapping_neg())
                .collect::<Vec<_>>()
        );
        collected.extend_from_slice(&batch.columns[0].values);
        if batch.end_of_input {
            break;
        }
    }
    assert_eq!(batches, 6);
    assert_eq!(reader.records_read(), 57);
    assert_eq!(collected, values);
}
