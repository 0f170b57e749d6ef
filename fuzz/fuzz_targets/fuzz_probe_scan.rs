// SPDX-License-Identifier: MIT OR Apache-2.0
//! libFuzzer target for schema probing and full row scans.
//!
//! Run with: cargo +nightly fuzz run fuzz_probe_scan

#![no_main]

use druidjson_core::{MetricSet, ReaderOptions};
use druidjson_stream::{EXHAUSTED, RowCursor, probe_reader};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 || data.is_empty() {
        return;
    }

    // first byte picks the chunk size and which columns are metrics
    let (control, input) = data.split_at(1);
    let options = ReaderOptions::with_chunk_size(usize::from(control[0] % 17) + 1);

    let Ok(schema) = probe_reader(Cursor::new(input), &MetricSet::new(), options) else {
        return;
    };
    let metrics: MetricSet = schema
        .iter()
        .enumerate()
        .filter(|(i, _)| control[0] & (1 << (i % 8)) != 0)
        .map(|(_, c)| c.name.clone())
        .collect();
    let schema = druidjson_core::TableSchema::from_labels(
        schema.iter().map(|c| c.name.clone()),
        &metrics,
    )
    .shared();

    let mut cursor = RowCursor::from_reader(schema.clone(), Cursor::new(input), options);
    let mut rows = 0usize;
    loop {
        match cursor.next_row() {
            Ok(true) => {
                rows += 1;
                if cursor.values().is_err() {
                    assert_eq!(cursor.row_id(), EXHAUSTED);
                    break;
                }
            }
            Ok(false) | Err(_) => break,
        }
    }

    // an exhausted cursor stays exhausted
    assert!(cursor.is_exhausted());
    assert!(!cursor.next_row().unwrap_or(true));
    assert_eq!(cursor.row_id(), EXHAUSTED);
    for i in 0..=schema.len() {
        assert!(cursor.value_at(i).is_ok_and(|v| v.is_null()));
    }

    // a rewound cursor replays the same number of leading rows
    cursor.rewind().unwrap();
    let mut replay = 0usize;
    while replay < rows && cursor.next_row().unwrap_or(false) {
        replay += 1;
    }
    assert_eq!(replay, rows);
});
