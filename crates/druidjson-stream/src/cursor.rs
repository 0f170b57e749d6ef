// SPDX-License-Identifier: MIT OR Apache-2.0
//! Row cursor
//!
//! Pulls one record at a time through a [`FieldReader`], checks every label
//! against the schema, and keeps the values in per-column buffers that are
//! reused across rows. Any error exhausts the cursor, including a coercion
//! error raised while reading a column; only [`RowCursor::rewind`] restarts a scan.

use crate::buffer;
use crate::field::{FieldReader, FieldStep};
use druidjson_core::value::parse_decimal_prefix;
use druidjson_core::{ColumnValue, DruidError, JsonKind, ReaderOptions, Result, TableSchema};
use std::cell::Cell;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Row identifier of an exhausted or failed cursor
pub const EXHAUSTED: i64 = -1;

#[derive(Debug, Default)]
struct Slot {
    buf: Vec<u8>,
    kind: JsonKind,
    present: bool,
    /// reader offset just past the value
    offset: u64,
}

impl Slot {
    fn reset(&mut self) {
        self.buf.clear();
        self.kind = JsonKind::Null;
        self.present = false;
        self.offset = 0;
    }
}

/// Forward-only cursor over the rows of a result file
#[derive(Debug)]
pub struct RowCursor<R = File> {
    reader: FieldReader<R>,
    schema: Arc<TableSchema>,
    slots: Vec<Slot>,
    row_id: i64,
    next_id: i64,
    // set by column reads, which only borrow the cursor
    failed: Cell<bool>,
}

impl RowCursor<File> {
    /// Open an independent cursor on `path`
    ///
    /// # Errors
    ///
    /// Returns [`DruidError::Io`] if the file cannot be opened.
    pub fn open(
        schema: Arc<TableSchema>,
        path: impl AsRef<Path>,
        options: ReaderOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        let reader = FieldReader::open(path, options)?;
        debug!(path = %path.display(), columns = schema.len(), "opened row cursor");
        Ok(Self::with_reader(schema, reader))
    }
}

impl<R: Read + Seek> RowCursor<R> {
    /// Cursor over an already-open input
    pub fn from_reader(schema: Arc<TableSchema>, inner: R, options: ReaderOptions) -> Self {
        Self::with_reader(schema, FieldReader::new(inner, options))
    }

    fn with_reader(schema: Arc<TableSchema>, reader: FieldReader<R>) -> Self {
        let slots = std::iter::repeat_with(Slot::default)
            .take(schema.len())
            .collect();
        Self {
            reader,
            schema,
            slots,
            row_id: 0,
            next_id: 0,
            failed: Cell::new(false),
        }
    }

    /// Schema this cursor validates against
    #[must_use]
    pub fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    /// Synthetic identifier of the current row, or [`EXHAUSTED`]
    #[must_use]
    pub fn row_id(&self) -> i64 {
        if self.failed.get() {
            EXHAUSTED
        } else {
            self.row_id
        }
    }

    /// Whether the scan has ended or failed
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.row_id() < 0
    }

    fn exhaust(&mut self) {
        self.row_id = EXHAUSTED;
        for slot in &mut self.slots {
            slot.reset();
        }
    }

    fn fail(&mut self, err: DruidError) -> DruidError {
        warn!(
            record = self.reader.record(),
            offset = self.reader.offset(),
            error = %err,
            "row cursor aborted"
        );
        self.exhaust();
        err
    }

    /// Materialize the next row
    ///
    /// Returns `false` once the input is exhausted. After an error the cursor
    /// stays exhausted until [`rewind`](Self::rewind).
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed or truncated input, and
    /// [`DruidError::SchemaViolation`] when a label differs from the schema
    /// or a record has more fields than the schema.
    pub fn next_row(&mut self) -> Result<bool> {
        if self.is_exhausted() {
            if self.row_id >= 0 {
                self.exhaust();
            }
            return Ok(false);
        }
        match self.fill_row() {
            Ok(true) => {
                self.row_id = self.next_id;
                self.next_id += 1;
                Ok(true)
            }
            Ok(false) => {
                debug!(rows = self.next_id, "row cursor reached end of input");
                self.exhaust();
                Ok(false)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn fill_row(&mut self) -> Result<bool> {
        let ncol = self.schema.len();
        let mut i = 0;
        loop {
            let step = self.reader.read_one_field()?;
            if step == FieldStep::EndOfStream {
                if i == 0 {
                    return Ok(false);
                }
                return Err(DruidError::parse(
                    self.reader.record(),
                    self.reader.offset(),
                    format!("unexpected end of input after {i} of {ncol} fields"),
                ));
            }
            // a closing field has already advanced the record counter
            let record = self.reader.record() - usize::from(step == FieldStep::LastField);
            let offset = self.reader.offset();
            let expected = self.schema.name(i).unwrap_or_default();
            if i >= ncol || self.reader.label() != expected.as_bytes() {
                return Err(DruidError::SchemaViolation {
                    record,
                    offset,
                    column: i,
                    expected: expected.to_string(),
                    found: String::from_utf8_lossy(self.reader.label()).into_owned(),
                });
            }
            let slot = &mut self.slots[i];
            buffer::assign(&mut slot.buf, self.reader.value(), "column")
                .map_err(|e| e.positioned(record, offset))?;
            slot.kind = self.reader.kind();
            slot.present = true;
            slot.offset = offset;
            i += 1;
            if step == FieldStep::LastField {
                break;
            }
        }
        for slot in &mut self.slots[i..] {
            slot.reset();
        }
        Ok(true)
    }

    /// Escape-expanded bytes of `column` in the current row
    #[must_use]
    pub fn raw(&self, column: usize) -> Option<&[u8]> {
        self.slots
            .get(column)
            .filter(|s| s.present)
            .map(|s| s.buf.as_slice())
    }

    /// JSON kind of `column` in the current row
    #[must_use]
    pub fn kind(&self, column: usize) -> Option<JsonKind> {
        self.slots.get(column).filter(|s| s.present).map(|s| s.kind)
    }

    /// Whether the current record supplied `column`
    #[must_use]
    pub fn is_present(&self, column: usize) -> bool {
        self.slots.get(column).is_some_and(|s| s.present)
    }

    /// Typed value of `column` in the current row
    ///
    /// Metric columns yield numbers (or `Null` for JSON `null`); other columns
    /// yield their text verbatim. Absent or out-of-range columns yield `Null`.
    ///
    /// # Errors
    ///
    /// Returns [`DruidError::TypeCoercion`] when a metric column holds a
    /// string or boolean, and a parse error when text is not valid UTF-8.
    pub fn value_at(&self, column: usize) -> Result<ColumnValue<'_>> {
        let Some(slot) = self
            .slots
            .get(column)
            .filter(|s| s.present && !self.failed.get())
        else {
            return Ok(ColumnValue::Null);
        };
        if self.schema.is_metric(column) {
            if !slot.kind.is_numeric_or_null() {
                let err = DruidError::TypeCoercion {
                    row: self.row_id,
                    offset: slot.offset,
                    column: self.schema.name(column).unwrap_or_default().to_string(),
                    value: String::from_utf8_lossy(&slot.buf).into_owned(),
                    kind: slot.kind,
                };
                warn!(error = %err, "metric coercion failed");
                self.failed.set(true);
                return Err(err);
            }
            if slot.kind == JsonKind::Null {
                return Ok(ColumnValue::Null);
            }
            return Ok(ColumnValue::Number(
                std::str::from_utf8(&slot.buf).map_or(0.0, parse_decimal_prefix),
            ));
        }
        std::str::from_utf8(&slot.buf)
            .map(ColumnValue::Text)
            .map_err(|_| {
                self.failed.set(true);
                DruidError::parse(
                    usize::try_from(self.row_id).unwrap_or_default(),
                    slot.offset,
                    format!(
                        "column '{}' is not valid UTF-8",
                        self.schema.name(column).unwrap_or_default()
                    ),
                )
            })
    }

    /// Typed values of every column in the current row
    ///
    /// # Errors
    ///
    /// See [`value_at`](Self::value_at).
    pub fn values(&self) -> Result<Vec<ColumnValue<'_>>> {
        (0..self.schema.len()).map(|i| self.value_at(i)).collect()
    }

    /// Restart the scan from the first record
    ///
    /// # Errors
    ///
    /// Returns [`DruidError::Read`] if the seek fails.
    pub fn rewind(&mut self) -> Result<()> {
        self.reader.rewind()?;
        for slot in &mut self.slots {
            slot.reset();
        }
        self.row_id = 0;
        self.next_id = 0;
        self.failed.set(false);
        debug!("row cursor rewound");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::probe_reader;
    use druidjson_core::{ErrorKind, MetricSet};
    use std::io::Cursor;

    fn cursor(data: &str, metrics: &str) -> RowCursor<Cursor<Vec<u8>>> {
        let options = ReaderOptions::with_chunk_size(6);
        let schema = probe_reader(
            Cursor::new(data.as_bytes().to_vec()),
            &MetricSet::parse_list(metrics),
            options,
        )
        .unwrap()
        .shared();
        RowCursor::from_reader(schema, Cursor::new(data.as_bytes().to_vec()), options)
    }

    #[test]
    fn test_flat_rows_as_text() {
        let mut c = cursor(r#"[{"a":1,"b":"hi"},{"a":2,"b":false}]"#, "");
        assert!(c.next_row().unwrap());
        assert_eq!(c.row_id(), 0);
        assert_eq!(c.value_at(0).unwrap(), ColumnValue::Text("1"));
        assert_eq!(c.value_at(1).unwrap(), ColumnValue::Text("hi"));
        assert!(c.next_row().unwrap());
        assert_eq!(c.row_id(), 1);
        assert_eq!(c.value_at(1).unwrap(), ColumnValue::Text("false"));
        assert_eq!(c.kind(1), Some(JsonKind::False));
        assert!(!c.next_row().unwrap());
        assert!(c.is_exhausted());
        assert_eq!(c.row_id(), EXHAUSTED);
        assert!(!c.next_row().unwrap());
    }

    #[test]
    fn test_metrics_coerced() {
        let mut c = cursor(
            r#"[{"ts":"2021-01-01T00:00:00Z","event":{"clicks":5,"cost":1.5}}]"#,
            "clicks,cost",
        );
        assert!(c.next_row().unwrap());
        assert_eq!(
            c.values().unwrap(),
            vec![
                ColumnValue::Text("2021-01-01T00:00:00Z"),
                ColumnValue::Number(5.0),
                ColumnValue::Number(1.5),
            ]
        );
    }

    #[test]
    fn test_null_metric_is_allowed() {
        let mut c = cursor(r#"[{"a":null}]"#, "a");
        assert!(c.next_row().unwrap());
        assert_eq!(c.value_at(0).unwrap(), ColumnValue::Null);
    }

    #[test]
    fn test_null_text_column_is_verbatim() {
        let mut c = cursor(r#"[{"a":null}]"#, "");
        assert!(c.next_row().unwrap());
        assert_eq!(c.value_at(0).unwrap(), ColumnValue::Text("null"));
    }

    #[test]
    fn test_string_metric_fails_on_its_row_only() {
        let mut c = cursor(r#"[{"m":1},{"m":"many"},{"m":3}]"#, "m");
        assert!(c.next_row().unwrap());
        assert_eq!(c.value_at(0).unwrap(), ColumnValue::Number(1.0));
        assert!(c.next_row().unwrap());
        assert_eq!(c.row_id(), 1);
        let err = c.value_at(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeCoercion);
        assert!(err.to_string().contains("m='many'"));
        assert!(err.to_string().contains("row 1"));
        // positioned just past the `}` closing the second record
        assert_eq!(err.record(), Some(1));
        assert_eq!(err.offset(), Some(21));
        assert!(err.to_string().starts_with("result 1(offset 21)"));
        // the scan is aborted, the third row is never produced
        assert!(c.is_exhausted());
        assert!(!c.next_row().unwrap());
        c.rewind().unwrap();
        assert!(c.next_row().unwrap());
        assert_eq!(c.value_at(0).unwrap(), ColumnValue::Number(1.0));
    }

    #[test]
    fn test_boolean_metric_fails() {
        let mut c = cursor(r#"[{"m":true}]"#, "m");
        assert!(c.next_row().unwrap());
        assert!(matches!(
            c.value_at(0),
            Err(DruidError::TypeCoercion {
                kind: JsonKind::True,
                ..
            })
        ));
    }

    #[test]
    fn test_reordered_record_is_schema_violation() {
        let mut c = cursor(r#"[{"a":1,"b":2},{"b":3,"a":4},{"a":5,"b":6}]"#, "");
        assert!(c.next_row().unwrap());
        let err = c.next_row().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert_eq!(err.record(), Some(1));
        assert!(c.is_exhausted());
        assert!(!c.next_row().unwrap());
        assert_eq!(c.value_at(0).unwrap(), ColumnValue::Null);
    }

    #[test]
    fn test_extra_field_is_schema_violation() {
        let mut c = cursor(r#"[{"a":1},{"a":2,"b":3}]"#, "");
        assert!(c.next_row().unwrap());
        match c.next_row().unwrap_err() {
            DruidError::SchemaViolation {
                record,
                column,
                expected,
                found,
                ..
            } => {
                assert_eq!(record, 1);
                assert_eq!(column, 1);
                assert_eq!(expected, "");
                assert_eq!(found, "b");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_short_record_pads_with_null() {
        let mut c = cursor(r#"[{"a":1,"b":2},{"a":3}]"#, "b");
        assert!(c.next_row().unwrap());
        assert_eq!(c.value_at(1).unwrap(), ColumnValue::Number(2.0));
        assert!(c.next_row().unwrap());
        assert_eq!(c.value_at(0).unwrap(), ColumnValue::Text("3"));
        assert!(!c.is_present(1));
        assert_eq!(c.value_at(1).unwrap(), ColumnValue::Null);
        assert_eq!(c.raw(1), None);
    }

    #[test]
    fn test_truncated_record_fails_without_partial_row() {
        let mut c = cursor(r#"[{"a":1,"b":"x"},{"a":2,"b":"tru"#, "");
        assert!(c.next_row().unwrap());
        let err = c.next_row().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(c.is_exhausted());
        assert_eq!(c.raw(0), None);
    }

    #[test]
    fn test_truncated_between_fields() {
        let mut c = cursor(r#"[{"a":1,"b":"x"},{"a":2,"#, "");
        assert!(c.next_row().unwrap());
        let err = c.next_row().unwrap_err();
        assert!(err.to_string().contains("after 1 of 2 fields"));
    }

    #[test]
    fn test_rewind_restarts_scan() {
        let mut c = cursor(r#"[{"a":"x"},{"a":"y"}]"#, "");
        while c.next_row().unwrap() {}
        assert!(c.is_exhausted());
        c.rewind().unwrap();
        assert!(!c.is_exhausted());
        assert!(c.next_row().unwrap());
        assert_eq!(c.row_id(), 0);
        assert_eq!(c.value_at(0).unwrap(), ColumnValue::Text("x"));
    }

    #[test]
    fn test_out_of_range_column_is_null() {
        let mut c = cursor(r#"[{"a":1}]"#, "");
        assert!(c.next_row().unwrap());
        assert_eq!(c.value_at(7).unwrap(), ColumnValue::Null);
    }
}
