// SPDX-License-Identifier: MIT OR Apache-2.0
//! Data source facade: probe once, open any number of cursors.

use crate::cursor::RowCursor;
use crate::probe::probe_path;
use druidjson_core::{ReaderOptions, Result, SourceOptions, TableSchema};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A Druid result file exposed as a table
#[derive(Debug, Clone)]
pub struct DruidTable {
    path: PathBuf,
    schema: Arc<TableSchema>,
    reader: ReaderOptions,
}

impl DruidTable {
    /// Probe the file named by `options` and fix its schema
    ///
    /// # Errors
    ///
    /// Returns [`druidjson_core::DruidError::Io`] if the file cannot be
    /// opened, or a parse error if its first record is unusable.
    pub fn open(options: &SourceOptions) -> Result<Self> {
        let schema = probe_path(&options.path, &options.metrics, options.reader)?;
        debug!(path = %options.path.display(), columns = schema.len(), "opened druid table");
        Ok(Self {
            path: options.path.clone(),
            schema: schema.shared(),
            reader: options.reader,
        })
    }

    /// Path of the underlying file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Discovered schema
    #[must_use]
    pub const fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    /// Open an independent cursor positioned before the first row
    ///
    /// # Errors
    ///
    /// Returns [`druidjson_core::DruidError::Io`] if the file cannot be opened.
    pub fn cursor(&self) -> Result<RowCursor<File>> {
        RowCursor::open(Arc::clone(&self.schema), &self.path, self.reader)
    }

    /// Count rows with a full scan
    ///
    /// # Errors
    ///
    /// Propagates the first error raised by the scan.
    pub fn count_rows(&self) -> Result<u64> {
        let mut cursor = self.cursor()?;
        let mut rows = 0;
        while cursor.next_row()? {
            rows += 1;
        }
        Ok(rows)
    }
}
