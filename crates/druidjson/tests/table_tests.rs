// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end tests over on-disk result files.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::float_cmp)]

use druidjson::{
    ColumnType, ColumnValue, DruidError, DruidTable, ErrorKind, JsonKind, MetricSet, RowCursor,
    SourceOptions,
};
use std::fs::File;
use std::path::PathBuf;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    path: PathBuf,
}

fn fixture(contents: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("raw_result.json");
    std::fs::write(&path, contents).unwrap();
    Fixture { _dir: dir, path }
}

fn open(fx: &Fixture, metrics: &str) -> DruidTable {
    let options = SourceOptions::new(&fx.path).with_metrics(MetricSet::parse_list(metrics));
    DruidTable::open(&options).unwrap()
}

fn rows_as_json(cursor: &mut RowCursor<File>) -> Vec<Vec<serde_json::Value>> {
    let mut rows = Vec::new();
    while cursor.next_row().unwrap() {
        rows.push(
            cursor
                .values()
                .unwrap()
                .iter()
                .map(ColumnValue::to_json)
                .collect(),
        );
    }
    rows
}

fn druid_result(n: usize) -> String {
    let records: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{"version":"v1","timestamp":"2021-01-{:02}T00:00:00.000Z","event":{{"country":"c\"{i}\"","clicks":{i},"cost":{}.25}}}}"#,
                i % 28 + 1,
                i * 3
            )
        })
        .collect();
    format!("[\n  {}\n]\n", records.join(",\n  "))
}

#[test]
fn test_full_scan_yields_one_row_per_element() {
    for n in [1, 2, 17, 300] {
        let fx = fixture(&druid_result(n));
        let table = open(&fx, "clicks,cost");
        assert_eq!(table.count_rows().unwrap(), n as u64, "n = {n}");
    }
}

#[test]
fn test_flat_schema_and_first_row() {
    let fx = fixture(r#"[{"a":1,"b":"hi"}]"#);
    let table = open(&fx, "");
    let described: Vec<_> = table.schema().describe().collect();
    assert_eq!(described, vec![("a", false), ("b", false)]);

    let mut cursor = table.cursor().unwrap();
    assert!(cursor.next_row().unwrap());
    assert_eq!(cursor.row_id(), 0);
    assert_eq!(cursor.value_at(0).unwrap(), ColumnValue::Text("1"));
    assert_eq!(cursor.value_at(1).unwrap(), ColumnValue::Text("hi"));
    assert!(!cursor.next_row().unwrap());
    assert!(cursor.is_exhausted());
}

#[test]
fn test_nested_event_schema_and_first_row() {
    let fx = fixture(r#"[{"ts":"2021-01-01T00:00:00Z","event":{"clicks":5,"cost":1.5}}]"#);
    let table = open(&fx, "clicks,cost");
    let types: Vec<_> = table
        .schema()
        .iter()
        .map(|c| (c.name.clone(), c.column_type()))
        .collect();
    assert_eq!(
        types,
        vec![
            ("ts".to_string(), ColumnType::Text),
            ("clicks".to_string(), ColumnType::Real),
            ("cost".to_string(), ColumnType::Real),
        ]
    );
    let mut cursor = table.cursor().unwrap();
    assert_eq!(
        rows_as_json(&mut cursor),
        vec![vec![
            serde_json::json!("2021-01-01T00:00:00Z"),
            serde_json::json!(5.0),
            serde_json::json!(1.5),
        ]]
    );
}

#[test]
fn test_null_metric() {
    let fx = fixture(r#"[{"a":null}]"#);
    let table = open(&fx, "a");
    let mut cursor = table.cursor().unwrap();
    assert!(cursor.next_row().unwrap());
    assert_eq!(cursor.value_at(0).unwrap(), ColumnValue::Null);
    assert_eq!(cursor.kind(0), Some(JsonKind::Null));
}

#[test]
fn test_string_metric_fails_on_its_row() {
    let fx = fixture(r#"[{"d":"x","m":1},{"d":"y","m":2},{"d":"z","m":"n/a"}]"#);
    // probing succeeds: coercion is a per-row concern
    let table = open(&fx, "m");
    let mut cursor = table.cursor().unwrap();
    for expected in [1.0, 2.0] {
        assert!(cursor.next_row().unwrap());
        assert_eq!(cursor.value_at(1).unwrap(), ColumnValue::Number(expected));
    }
    assert!(cursor.next_row().unwrap());
    assert_eq!(cursor.value_at(0).unwrap(), ColumnValue::Text("z"));
    let err = cursor.value_at(1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeCoercion);
    assert!(matches!(err, DruidError::TypeCoercion { row: 2, .. }));
}

#[test]
fn test_reordered_second_record() {
    let fx = fixture(r#"[{"a":1,"b":2},{"b":2,"a":1},{"a":1,"b":2}]"#);
    let table = open(&fx, "");
    let mut cursor = table.cursor().unwrap();
    assert!(cursor.next_row().unwrap());
    let err = cursor.next_row().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert_eq!(err.record(), Some(1));
    assert!(err.to_string().contains("order change is not supported"));
    assert!(!cursor.next_row().unwrap());
}

#[test]
fn test_extra_label_in_second_record() {
    let fx = fixture(r#"[{"a":1},{"a":1,"z":0}]"#);
    let table = open(&fx, "");
    let mut cursor = table.cursor().unwrap();
    assert!(cursor.next_row().unwrap());
    let err = cursor.next_row().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert_eq!(err.record(), Some(1));
    assert!(cursor.is_exhausted());
}

#[test]
fn test_truncated_file() {
    let full = druid_result(5);
    let cut = &full[..full.len() / 2];
    let fx = fixture(cut);
    let table = open(&fx, "clicks,cost");
    let mut cursor = table.cursor().unwrap();
    let mut rows = 0;
    let err = loop {
        match cursor.next_row() {
            Ok(true) => rows += 1,
            Ok(false) => panic!("truncated input must not end cleanly"),
            Err(err) => break err,
        }
    };
    assert!(rows < 5);
    assert!(matches!(err.kind(), ErrorKind::Parse | ErrorKind::Io));
    assert!(cursor.is_exhausted());
    assert!(cursor.values().unwrap().iter().all(ColumnValue::is_null));
}

#[test]
fn test_rewind_reproduces_scan() {
    let fx = fixture(&druid_result(40));
    let table = open(&fx, "clicks");
    let mut cursor = table.cursor().unwrap();
    let first = rows_as_json(&mut cursor);
    cursor.rewind().unwrap();
    let second = rows_as_json(&mut cursor);
    assert_eq!(first.len(), 40);
    assert_eq!(first, second);
}

#[test]
fn test_independent_cursors_interleave() {
    let fx = fixture(&druid_result(10));
    let table = open(&fx, "clicks");
    let mut a = table.cursor().unwrap();
    let mut b = table.cursor().unwrap();
    assert!(a.next_row().unwrap());
    assert!(a.next_row().unwrap());
    assert!(b.next_row().unwrap());
    assert_eq!(a.row_id(), 1);
    assert_eq!(b.row_id(), 0);
    assert_eq!(a.value_at(3).unwrap(), ColumnValue::Number(1.0));
    assert_eq!(b.value_at(3).unwrap(), ColumnValue::Number(0.0));
    assert_eq!(b.value_at(2).unwrap(), ColumnValue::Text("c\"0\""));
}

#[test]
fn test_small_chunks_match_default_chunks() {
    let fx = fixture(&druid_result(25));
    let tiny = DruidTable::open(
        &SourceOptions::new(&fx.path)
            .with_metrics(MetricSet::parse_list("clicks,cost"))
            .with_chunk_size(1),
    )
    .unwrap();
    let normal = open(&fx, "clicks,cost");
    assert_eq!(tiny.schema(), normal.schema());
    assert_eq!(
        rows_as_json(&mut tiny.cursor().unwrap()),
        rows_as_json(&mut normal.cursor().unwrap())
    );
}

#[test]
fn test_options_from_json_config() {
    let fx = fixture(&druid_result(3));
    let config = serde_json::json!({
        "path": fx.path,
        "metrics": ["clicks", "cost"],
        "reader": {"chunk_size": 64}
    });
    let options: SourceOptions = serde_json::from_value(config).unwrap();
    let table = DruidTable::open(&options).unwrap();
    assert_eq!(table.path(), fx.path.as_path());
    assert_eq!(table.schema().column_index("cost"), Some(4));
    assert!(table.schema().is_metric(4));
    assert_eq!(table.count_rows().unwrap(), 3);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let options = SourceOptions::new(dir.path().join("absent.json"));
    let err = DruidTable::open(&options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn test_cursor_after_file_removed_is_io_error() {
    let fx = fixture(r#"[{"a":1}]"#);
    let table = open(&fx, "");
    std::fs::remove_file(&fx.path).unwrap();
    let err = table.cursor().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}
