// SPDX-License-Identifier: MIT OR Apache-2.0
//! Schema prober
//!
//! Consumes exactly the first record: one pass counts its fields, a second
//! pass over the same record collects the labels in order. The reader is left
//! rewound to the start of the data.

use crate::field::{FieldReader, FieldStep};
use druidjson_core::{DruidError, MetricSet, ReaderOptions, Result, TableSchema};
use std::io::{Read, Seek};
use std::path::Path;
use tracing::debug;

/// Discover the schema of the result file at `path`
///
/// # Errors
///
/// Returns [`DruidError::Io`] if the file cannot be opened, and a parse error
/// if the first record is malformed, truncated, missing or has duplicate labels.
pub fn probe_path(
    path: impl AsRef<Path>,
    metrics: &MetricSet,
    options: ReaderOptions,
) -> Result<TableSchema> {
    let mut reader = FieldReader::open(path, options)?;
    probe(&mut reader, metrics)
}

/// Discover the schema of an in-memory or otherwise seekable input
///
/// # Errors
///
/// See [`probe_path`].
pub fn probe_reader<R: Read + Seek>(
    inner: R,
    metrics: &MetricSet,
    options: ReaderOptions,
) -> Result<TableSchema> {
    let mut reader = FieldReader::new(inner, options);
    probe(&mut reader, metrics)
}

/// Discover the schema using an existing reader positioned at the start
///
/// # Errors
///
/// See [`probe_path`].
pub fn probe<R: Read + Seek>(
    reader: &mut FieldReader<R>,
    metrics: &MetricSet,
) -> Result<TableSchema> {
    let count = count_first_record(reader)?;
    reader.rewind()?;

    let mut labels: Vec<String> = Vec::with_capacity(count);
    loop {
        let step = reader.read_one_field()?;
        if step == FieldStep::EndOfStream || labels.len() == count {
            return Err(DruidError::parse(
                0,
                reader.offset(),
                "first record changed between probe passes",
            ));
        }
        let label = std::str::from_utf8(reader.label()).map_err(|_| {
            DruidError::parse(0, reader.offset(), "column label is not valid UTF-8")
        })?;
        if labels.iter().any(|l| l == label) {
            return Err(DruidError::parse(
                0,
                reader.offset(),
                format!("duplicate column label '{label}'"),
            ));
        }
        labels.push(label.to_string());
        if step == FieldStep::LastField {
            break;
        }
    }
    if labels.len() != count {
        return Err(DruidError::parse(
            0,
            reader.offset(),
            "first record changed between probe passes",
        ));
    }
    reader.rewind()?;

    let schema = TableSchema::from_labels(labels, metrics);
    debug!(
        columns = schema.len(),
        metrics = schema.iter().filter(|c| c.metric).count(),
        "probed schema"
    );
    Ok(schema)
}

fn count_first_record<R: Read + Seek>(reader: &mut FieldReader<R>) -> Result<usize> {
    let mut count = 0;
    loop {
        match reader.read_one_field()? {
            FieldStep::Field => count += 1,
            FieldStep::LastField => return Ok(count + 1),
            FieldStep::EndOfStream if count == 0 => {
                return Err(DruidError::parse(0, reader.offset(), "no records found"));
            }
            FieldStep::EndOfStream => {
                return Err(DruidError::parse(
                    0,
                    reader.offset(),
                    "unexpected end of input inside first record",
                ));
            }
        }
    }
}
