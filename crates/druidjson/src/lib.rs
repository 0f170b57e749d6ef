// SPDX-License-Identifier: MIT OR Apache-2.0
//! # druidjson
//!
//! Expose a Druid time-series query result - a JSON array of flat or
//! `"event"`-nested records - as a row-oriented, schema-bearing data source,
//! without loading the file into memory.
//!
//! ```no_run
//! use druidjson::{ColumnValue, DruidTable, MetricSet, SourceOptions};
//!
//! # fn main() -> druidjson::Result<()> {
//! let options = SourceOptions::new("raw_result.json")
//!     .with_metrics(MetricSet::parse_list("clicks,impressions,cost"));
//! let table = DruidTable::open(&options)?;
//! for (name, numeric) in table.schema().describe() {
//!     println!("{name}: {}", if numeric { "REAL" } else { "TEXT" });
//! }
//! let mut cursor = table.cursor()?;
//! while cursor.next_row()? {
//!     if let ColumnValue::Number(clicks) = cursor.value_at(1)? {
//!         println!("row {} clicks={clicks}", cursor.row_id());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! - [`druidjson-core`](https://docs.rs/druidjson-core) - Errors, value kinds, schema
//! - [`druidjson-stream`](https://docs.rs/druidjson-stream) - Parser and row cursor

#![deny(missing_docs)]
#![deny(rust_2018_idioms)]

pub use druidjson_core::{
    Column, ColumnType, ColumnValue, DEFAULT_CHUNK_SIZE, DruidError, ErrorKind, JsonKind,
    MetricSet, ReaderOptions, Result, SourceOptions, TableSchema,
};
pub use druidjson_stream::{
    DruidTable, EXHAUSTED, FieldReader, FieldStep, RowCursor, probe, probe_path, probe_reader,
};

/// Re-export of druidjson-core.
pub use druidjson_core as core;

/// Re-export of druidjson-stream.
pub use druidjson_stream as stream;
