// SPDX-License-Identifier: MIT OR Apache-2.0
//! Core types, error handling, and the schema model for druidjson
//!
//! This crate provides the foundational types shared by the streaming engine
//! and its callers:
//!
//! - [`error`] - Error taxonomy and Result alias
//! - [`value`] - JSON value kinds and typed column values
//! - [`schema`] - Immutable table schema and metric-name sets
//! - [`options`] - Construction and reader options

#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::cargo)]

/// Error types for druidjson operations
pub mod error;
/// Construction and reader options
pub mod options;
/// Table schema and metric column designation
pub mod schema;
/// JSON value kinds and typed column values
pub mod value;

// Re-exports for convenience
pub use error::{DruidError, ErrorKind, Result};
pub use options::{DEFAULT_CHUNK_SIZE, ReaderOptions, SourceOptions};
pub use schema::{Column, ColumnType, MetricSet, TableSchema};
pub use value::{ColumnValue, JsonKind};
