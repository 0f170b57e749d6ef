// SPDX-License-Identifier: MIT OR Apache-2.0
//! Streaming engine for druidjson
//!
//! Reads a Druid result file (a JSON array of flat records, or of records with
//! one nested `"event"` object) in a single forward pass:
//! - [`source`] - Buffered, refillable byte source
//! - [`scanner`] - Scalar token scanner
//! - [`field`] - Field reader with `event` flattening
//! - [`probe`] - One-record schema prober
//! - [`cursor`] - Schema-checked row cursor
//! - [`table`] - Probe-once, cursor-many facade

#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]

mod buffer;
/// Byte classification tables
pub mod classify;
/// Row cursor
pub mod cursor;
/// Field reader
pub mod field;
/// Schema prober
pub mod probe;
/// Token scanner
pub mod scanner;
/// Buffered byte source
pub mod source;
/// Table facade
pub mod table;

pub use cursor::{EXHAUSTED, RowCursor};
pub use field::{FieldReader, FieldStep};
pub use probe::{probe, probe_path, probe_reader};
pub use source::{ByteSource, Skip};
pub use table::DruidTable;
