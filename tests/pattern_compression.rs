use jointanc::alignment::Alignment;
use jointanc::pattern::compress;

fn records(rows: &[(&str, &str)]) -> Vec<(String, String)> {
    rows.iter().map(|(id, seq)| (id.to_string(), seq.to_string())).collect()
}

#[test]
fn compress_when_columns_repeat_then_groups_them_into_one_pattern() {
    let records = records(&[("A", "AACT"), ("B", "CCCA"), ("C", "GGCT")]);
    let alignment = Alignment::from_records(&records).unwrap();

    let patterns = compress(&alignment, 3);

    assert_eq!(patterns.len(), 3, "columns 0 and 1 share a pattern, columns 2 and 3 are each unique");
    let shared = patterns.iter().find(|p| p.columns.len() == 2).expect("shared pattern");
    assert_eq!(shared.columns, vec![0, 1]);
}

#[test]
fn compress_when_every_column_is_unique_then_yields_one_pattern_per_column() {
    let records = records(&[("A", "ACGT"), ("B", "CGTA"), ("C", "GTAC")]);
    let alignment = Alignment::from_records(&records).unwrap();

    let patterns = compress(&alignment, 3);

    assert_eq!(patterns.len(), 4);
    for pattern in &patterns {
        assert_eq!(pattern.columns.len(), 1);
    }
}

#[test]
fn compress_when_columns_repeat_then_bucket_preserves_ascending_column_order() {
    let records = records(&[("A", "AAAA"), ("B", "CCCC")]);
    let alignment = Alignment::from_records(&records).unwrap();

    let patterns = compress(&alignment, 2);

    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].columns, vec![0, 1, 2, 3]);
}

#[test]
fn compress_when_n_leaf_rows_excludes_placeholder_rows_then_identity_ignores_them() {
    let records = records(&[("A", "AA"), ("B", "CC")]);
    let mut alignment = Alignment::from_records(&records).unwrap();
    alignment.extend_rows(vec!["Node_1".into()]);
    // Placeholder row differs across the two columns; if `compress` read it,
    // columns 0 and 1 would no longer look identical.
    alignment.set_cell(2, 0, b'G');
    alignment.set_cell(2, 1, b'T');

    let patterns = compress(&alignment, 2);

    assert_eq!(patterns.len(), 1, "placeholder row must not affect pattern identity");
    assert_eq!(patterns[0].columns, vec![0, 1]);
}
