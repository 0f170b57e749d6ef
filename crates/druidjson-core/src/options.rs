// SPDX-License-Identifier: MIT OR Apache-2.0
//! Construction options for a Druid result data source.

use crate::schema::MetricSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default refill chunk size in bytes
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Options for the buffered byte source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Bytes requested per refill read
    pub chunk_size: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ReaderOptions {
    /// Options with the given chunk size, clamped to at least one byte
    #[must_use]
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Chunk size actually used for reads
    #[must_use]
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}

/// Everything a caller supplies to construct a data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOptions {
    /// Resolved path of the result file
    pub path: PathBuf,
    /// Columns coerced to numbers
    #[serde(default)]
    pub metrics: MetricSet,
    /// Byte source tuning
    #[serde(default)]
    pub reader: ReaderOptions,
}

impl SourceOptions {
    /// Options for `path` with no metric columns
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            metrics: MetricSet::new(),
            reader: ReaderOptions::default(),
        }
    }

    /// Set the metric column names
    #[must_use]
    pub fn with_metrics(mut self, metrics: MetricSet) -> Self {
        self.metrics = metrics;
        self
    }

    /// Set the refill chunk size
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.reader = ReaderOptions::with_chunk_size(chunk_size);
        self
    }
}
