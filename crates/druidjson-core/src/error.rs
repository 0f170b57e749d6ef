// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error taxonomy for probing and scanning Druid result files.
//!
//! Every error aborts the scan that produced it. Positional variants carry the
//! index of the record being read and the byte offset of the reader at the time.

use crate::value::JsonKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the druidjson engine
#[derive(Error, Debug)]
pub enum DruidError {
    /// The input file could not be opened
    #[error("cannot open '{}' for reading: {source}", .path.display())]
    Io {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A read or seek on an open source failed
    #[error("result {record}(offset {offset}): read failed: {source}")]
    Read {
        /// Index of the record being read
        record: usize,
        /// Byte offset of the reader when the read failed
        offset: u64,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A buffer could not grow
    #[error(
        "result {record}(offset {offset}): out of memory: cannot grow {what} buffer \
         to {requested} bytes"
    )]
    Allocation {
        /// Index of the record being read
        record: usize,
        /// Byte offset of the reader
        offset: u64,
        /// Which buffer was growing
        what: &'static str,
        /// Requested capacity in bytes
        requested: usize,
    },

    /// Unexpected character, escape, literal or end of input
    #[error("result {record}(offset {offset}): {message}")]
    Parse {
        /// Index of the record being read
        record: usize,
        /// Byte offset of the reader
        offset: u64,
        /// Human-readable description
        message: String,
    },

    /// A record disagrees with the discovered column names or order
    #[error(
        "result {record}(offset {offset}): druid json order change is not supported \
         (column {column}: expected '{expected}', found '{found}')"
    )]
    SchemaViolation {
        /// Index of the offending record
        record: usize,
        /// Byte offset of the reader
        offset: u64,
        /// Column position where the mismatch occurred
        column: usize,
        /// Label required by the schema (empty when the record has an extra field)
        expected: String,
        /// Label found in the record
        found: String,
    },

    /// A metric column holds a value that is neither a number nor null
    #[error(
        "result {row}(offset {offset}): unexpected JSON value inside a metric at row {row}, \
         got {column}='{value}' ({kind}), expected number / null"
    )]
    TypeCoercion {
        /// Row identifier of the offending row
        row: i64,
        /// Byte offset just past the offending value
        offset: u64,
        /// Column name
        column: String,
        /// Raw value text
        value: String,
        /// JSON kind that was found
        kind: JsonKind,
    },
}

/// Coarse classification of a [`DruidError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// File unopenable or unreadable
    Io,
    /// Buffer growth failed
    Allocation,
    /// Malformed input
    Parse,
    /// Column identity or order drift
    Schema,
    /// Metric column holds a non-numeric value
    TypeCoercion,
}

impl DruidError {
    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::Read { .. } => ErrorKind::Io,
            Self::Allocation { .. } => ErrorKind::Allocation,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::SchemaViolation { .. } => ErrorKind::Schema,
            Self::TypeCoercion { .. } => ErrorKind::TypeCoercion,
        }
    }

    /// Build a parse error at a position
    pub fn parse(record: usize, offset: u64, message: impl Into<String>) -> Self {
        Self::Parse {
            record,
            offset,
            message: message.into(),
        }
    }

    /// Fill in the position of an error raised below the record-tracking layer
    ///
    /// Sets the record index of [`Read`](Self::Read) and
    /// [`Allocation`](Self::Allocation) errors, and the offset of allocation
    /// errors. Other variants are returned unchanged.
    #[must_use]
    pub fn positioned(self, record: usize, offset: u64) -> Self {
        match self {
            Self::Read {
                offset: at, source, ..
            } => Self::Read {
                record,
                offset: at,
                source,
            },
            Self::Allocation {
                what, requested, ..
            } => Self::Allocation {
                record,
                offset,
                what,
                requested,
            },
            other => other,
        }
    }

    /// Index of the record the error was raised in, if positional
    #[must_use]
    pub fn record(&self) -> Option<usize> {
        match self {
            Self::Read { record, .. }
            | Self::Allocation { record, .. }
            | Self::Parse { record, .. }
            | Self::SchemaViolation { record, .. } => Some(*record),
            Self::TypeCoercion { row, .. } => usize::try_from(*row).ok(),
            Self::Io { .. } => None,
        }
    }

    /// Byte offset of the reader when the error was raised, if positional
    #[must_use]
    pub const fn offset(&self) -> Option<u64> {
        match self {
            Self::Read { offset, .. }
            | Self::Allocation { offset, .. }
            | Self::Parse { offset, .. }
            | Self::SchemaViolation { offset, .. }
            | Self::TypeCoercion { offset, .. } => Some(*offset),
            Self::Io { .. } => None,
        }
    }
}

/// Result type alias for druidjson operations
pub type Result<T> = std::result::Result<T, DruidError>;
