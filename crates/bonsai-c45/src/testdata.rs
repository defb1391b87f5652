//! Shared dataset fixtures for unit tests.

use crate::dataset::{AttributeSpec, Dataset, Schema};

pub(crate) fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// The classic 14-case golf weather data: play unless the outlook is sunny
/// with high humidity or rainy with wind.
pub(crate) fn weather() -> Dataset {
    let schema = Schema::new(
        vec![
            AttributeSpec::discrete("outlook", strings(&["sunny", "overcast", "rain"])),
            AttributeSpec::continuous("temperature"),
            AttributeSpec::continuous("humidity"),
            AttributeSpec::discrete("windy", strings(&["true", "false"])),
            AttributeSpec::discrete("play", strings(&["yes", "no"])),
        ],
        4,
    )
    .unwrap();
    let rows = [
        ("sunny", "85", "85", "false", "no"),
        ("sunny", "80", "90", "true", "no"),
        ("overcast", "83", "78", "false", "yes"),
        ("rain", "70", "96", "false", "yes"),
        ("rain", "68", "80", "false", "yes"),
        ("rain", "65", "70", "true", "no"),
        ("overcast", "64", "65", "true", "yes"),
        ("sunny", "72", "95", "false", "no"),
        ("sunny", "69", "70", "false", "yes"),
        ("rain", "75", "80", "false", "yes"),
        ("sunny", "75", "70", "true", "yes"),
        ("overcast", "72", "90", "true", "yes"),
        ("overcast", "81", "75", "false", "yes"),
        ("rain", "71", "80", "true", "no"),
    ]
    .iter()
    .map(|&(o, t, h, w, p)| strings(&[o, t, h, w, p]))
    .collect();
    Dataset::new("weather", schema, rows).unwrap()
}

/// One continuous attribute cleanly separating two classes at 5.0.
pub(crate) fn separable() -> Dataset {
    let schema = Schema::new(
        vec![
            AttributeSpec::continuous("size"),
            AttributeSpec::discrete("label", strings(&["a", "b"])),
        ],
        1,
    )
    .unwrap();
    let rows = [("1", "a"), ("2", "a"), ("3", "a"), ("7", "b"), ("8", "b"), ("9", "b")]
        .iter()
        .map(|&(v, c)| strings(&[v, c]))
        .collect();
    Dataset::new("separable", schema, rows).unwrap()
}

/// A unique per-case identifier column next to a constant column; nothing
/// here is a legitimate test attribute.
pub(crate) fn unique_ids() -> Dataset {
    let ids: Vec<String> = (0..8).map(|i| format!("id{i}")).collect();
    let schema = Schema::new(
        vec![
            AttributeSpec::discrete("id", ids.clone()),
            AttributeSpec::discrete("filler", strings(&["k"])),
            AttributeSpec::discrete("label", strings(&["a", "b"])),
        ],
        2,
    )
    .unwrap();
    let rows = ids
        .iter()
        .enumerate()
        .map(|(i, id)| strings(&[id, "k", if i % 2 == 0 { "a" } else { "b" }]))
        .collect();
    Dataset::new("unique-ids", schema, rows).unwrap()
}

/// Eight cases over one two-valued attribute; one case misses its value and
/// must spread fractionally over both branches.
pub(crate) fn missing_split() -> Dataset {
    let schema = Schema::new(
        vec![
            AttributeSpec::discrete("a", strings(&["u", "v"])),
            AttributeSpec::discrete("label", strings(&["yes", "no"])),
        ],
        1,
    )
    .unwrap();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for _ in 0..3 {
        rows.push(strings(&["u", "yes"]));
    }
    for _ in 0..4 {
        rows.push(strings(&["v", "no"]));
    }
    rows.push(strings(&["?", "yes"]));
    Dataset::new("missing-split", schema, rows).unwrap()
}
