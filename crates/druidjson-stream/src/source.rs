// SPDX-License-Identifier: MIT OR Apache-2.0
//! Buffered byte source
//!
//! Chunked, refillable reads with optional skipping of whitespace and of the
//! structural prefix characters `,` `{` `[`. A byte-offset counter tracks how
//! far the consumer has advanced; [`ByteSource::rewind`] seeks back to the start.
//!
//! The source does not count records: its read and allocation errors report
//! record 0 until [`crate::FieldReader`] positions them.

use crate::buffer;
use crate::classify::{is_space, is_space_or_prefix};
use druidjson_core::{DruidError, ReaderOptions, Result};
use memchr::memchr2;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::trace;

/// Render a byte for an error message
pub(crate) fn show(c: u8) -> String {
    if c.is_ascii_graphic() || c == b' ' {
        char::from(c).to_string()
    } else {
        c.escape_ascii().to_string()
    }
}

/// What to skip while searching for the next byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// Return the very next byte
    Nothing,
    /// Skip JSON whitespace
    Whitespace,
    /// Skip whitespace and `,` `{` `[`
    Prefix,
}

impl Skip {
    #[inline]
    const fn skips(self, b: u8) -> bool {
        match self {
            Self::Nothing => false,
            Self::Whitespace => is_space(b),
            Self::Prefix => is_space_or_prefix(b),
        }
    }
}

/// Refillable read buffer over a seekable input
#[derive(Debug)]
pub struct ByteSource<R> {
    inner: R,
    buf: Box<[u8]>,
    pos: usize,
    filled: usize,
    offset: u64,
}

impl ByteSource<File> {
    /// Open `path` for reading
    ///
    /// # Errors
    ///
    /// Returns [`DruidError::Io`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DruidError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file, options))
    }
}

impl<R: Read + Seek> ByteSource<R> {
    /// Wrap an already-open input
    pub fn new(inner: R, options: ReaderOptions) -> Self {
        Self {
            inner,
            buf: vec![0; options.effective_chunk_size()].into_boxed_slice(),
            pos: 0,
            filled: 0,
            offset: 0,
        }
    }

    /// Number of bytes consumed since the start of the input
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Build a parse error at the current offset
    pub fn error(&self, record: usize, message: impl Into<String>) -> DruidError {
        DruidError::parse(record, self.offset, message)
    }

    /// One bounded read into the buffer; `false` at end of input
    #[cold]
    fn refill(&mut self) -> Result<bool> {
        debug_assert!(self.pos >= self.filled);
        let got = loop {
            match self.inner.read(&mut self.buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(source) => {
                    return Err(DruidError::Read {
                        record: 0,
                        offset: self.offset,
                        source,
                    });
                }
            }
        };
        trace!(offset = self.offset, got, "refilled input buffer");
        self.pos = 0;
        self.filled = got;
        Ok(got > 0)
    }

    /// Next byte after skipping, consuming it when `advance` is set
    ///
    /// Skipped bytes are always consumed. Returns `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`DruidError::Read`] if the underlying read fails.
    pub fn next_byte(&mut self, advance: bool, skip: Skip) -> Result<Option<u8>> {
        loop {
            if self.pos >= self.filled && !self.refill()? {
                return Ok(None);
            }
            let b = self.buf[self.pos];
            if skip.skips(b) {
                self.consume(1);
                continue;
            }
            if advance {
                self.consume(1);
            }
            return Ok(Some(b));
        }
    }

    /// Look at the next byte without consuming it
    ///
    /// # Errors
    ///
    /// Returns [`DruidError::Read`] if the underlying read fails.
    #[inline]
    pub fn peek(&mut self, skip: Skip) -> Result<Option<u8>> {
        self.next_byte(false, skip)
    }

    /// Consume and return the next byte
    ///
    /// # Errors
    ///
    /// Returns [`DruidError::Read`] if the underlying read fails.
    #[inline]
    pub fn bump(&mut self, skip: Skip) -> Result<Option<u8>> {
        self.next_byte(true, skip)
    }

    /// Consume the byte last returned by [`peek`](Self::peek)
    #[inline]
    pub fn advance(&mut self) {
        if self.pos < self.filled {
            self.consume(1);
        }
    }

    #[inline]
    const fn consume(&mut self, n: usize) {
        self.pos += n;
        self.offset += n as u64;
    }

    /// Copy bytes into `out` up to the next `"` or `\`, consuming the delimiter
    ///
    /// Returns the delimiter, or `None` if the input ends first.
    ///
    /// # Errors
    ///
    /// Returns [`DruidError::Read`] on a failed read and
    /// [`DruidError::Allocation`] if `out` cannot grow.
    pub fn copy_until_quote_or_escape(
        &mut self,
        out: &mut Vec<u8>,
        what: &'static str,
    ) -> Result<Option<u8>> {
        loop {
            if self.pos >= self.filled && !self.refill()? {
                return Ok(None);
            }
            let window = &self.buf[self.pos..self.filled];
            if let Some(i) = memchr2(b'"', b'\\', window) {
                let delim = window[i];
                buffer::extend(out, &window[..i], what)?;
                self.consume(i + 1);
                return Ok(Some(delim));
            }
            let n = window.len();
            buffer::extend(out, window, what)?;
            self.consume(n);
        }
    }

    /// Seek back to the start of the input and drop buffered bytes
    ///
    /// # Errors
    ///
    /// Returns [`DruidError::Read`] if the seek fails.
    pub fn rewind(&mut self) -> Result<()> {
        self.inner
            .seek(SeekFrom::Start(0))
            .map_err(|source| DruidError::Read {
                record: 0,
                offset: self.offset,
                source,
            })?;
        self.pos = 0;
        self.filled = 0;
        self.offset = 0;
        Ok(())
    }
}
