// SPDX-License-Identifier: MIT OR Apache-2.0
//! Field reader: the flattening state machine
//!
//! Reads one `"label": value` pair per call. A top-level `"event": {...}` key
//! is never emitted; its object's fields are read in its place, so
//! `{"ts": 1, "event": {"a": 2}}` yields the same fields as `{"ts": 1, "a": 2}`.
//! Flattening is one level deep.

use crate::scanner::{Scanner, Target};
use crate::source::{ByteSource, Skip, show};
use druidjson_core::{JsonKind, ReaderOptions, Result};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Label whose object value is merged into the enclosing record
pub const EVENT_LABEL: &[u8] = b"event";

/// Outcome of [`FieldReader::read_one_field`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStep {
    /// A field was read and the record continues
    Field,
    /// A field was read and it closed the record
    LastField,
    /// No further records
    EndOfStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nesting {
    AtTop,
    InsideEvent,
}

/// Reader context for one pass over a result file
#[derive(Debug)]
pub struct FieldReader<R> {
    scanner: Scanner<R>,
    nesting: Nesting,
    fields_in_record: usize,
}

impl FieldReader<File> {
    /// Open `path` for a fresh pass
    ///
    /// # Errors
    ///
    /// Returns [`druidjson_core::DruidError::Io`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self> {
        Ok(Self::from_source(ByteSource::open(path, options)?))
    }
}

impl<R: Read + Seek> FieldReader<R> {
    /// Reader over an already-open input
    pub fn new(inner: R, options: ReaderOptions) -> Self {
        Self::from_source(ByteSource::new(inner, options))
    }

    fn from_source(source: ByteSource<R>) -> Self {
        Self {
            scanner: Scanner::from_source(source),
            nesting: Nesting::AtTop,
            fields_in_record: 0,
        }
    }

    /// Label of the last field read
    #[must_use]
    pub fn label(&self) -> &[u8] {
        self.scanner.label()
    }

    /// Raw, escape-expanded value text of the last field read
    #[must_use]
    pub fn value(&self) -> &[u8] {
        self.scanner.value()
    }

    /// Kind of the last value read
    #[must_use]
    pub const fn kind(&self) -> JsonKind {
        self.scanner.kind()
    }

    /// Number of records completed so far, which is also the index of the
    /// record being read
    #[must_use]
    pub const fn record(&self) -> usize {
        self.scanner.record
    }

    /// Byte offset of the reader
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.scanner.source.offset()
    }

    /// Seek back to the start of the data and reset the record counter
    ///
    /// # Errors
    ///
    /// Returns [`druidjson_core::DruidError::Read`] if the seek fails.
    pub fn rewind(&mut self) -> Result<()> {
        self.scanner
            .source
            .rewind()
            .map_err(|e| e.positioned(self.scanner.record, self.offset()))?;
        self.scanner.record = 0;
        self.scanner.clear();
        self.nesting = Nesting::AtTop;
        self.fields_in_record = 0;
        Ok(())
    }

    fn unexpected(&self, expected: &str, got: Option<u8>) -> druidjson_core::DruidError {
        let found = got.map_or_else(
            || "end of input".to_string(),
            |c| format!("'{}' character", show(c)),
        );
        self.scanner
            .source
            .error(self.scanner.record, format!("expected {expected} got {found}"))
    }

    /// Read the next field of the current record
    ///
    /// # Errors
    ///
    /// Returns a parse error on any structural mismatch, naming the record
    /// index, byte offset and unexpected character. Read and allocation
    /// failures carry the same position.
    pub fn read_one_field(&mut self) -> Result<FieldStep> {
        self.step()
            .map_err(|e| e.positioned(self.scanner.record, self.offset()))
    }

    fn step(&mut self) -> Result<FieldStep> {
        self.scanner.clear();
        loop {
            let c = self.scanner.source.bump(Skip::Prefix)?;
            match c {
                None if self.nesting == Nesting::AtTop => return Ok(FieldStep::EndOfStream),
                // closes the enclosing array (covers `[]` too)
                Some(b']') if self.nesting == Nesting::AtTop && self.fields_in_record == 0 => {
                    continue;
                }
                Some(b'"') => {}
                other => return Err(self.unexpected("'\"'", other)),
            }

            self.scanner.read_string(Target::Label)?;
            let c = self.scanner.source.bump(Skip::Whitespace)?;
            if c != Some(b':') {
                return Err(self.unexpected("':'", c));
            }

            if self.nesting == Nesting::AtTop && self.scanner.label() == EVENT_LABEL {
                let c = self.scanner.source.peek(Skip::Whitespace)?;
                if c != Some(b'{') {
                    return Err(self.unexpected("'{' after \"event\"", c));
                }
                self.scanner.source.advance();
                self.nesting = Nesting::InsideEvent;
                self.scanner.clear();
                continue;
            }
            break;
        }

        self.scanner.read_value()?;

        let mut c = self.scanner.source.bump(Skip::Whitespace)?;
        if !matches!(c, Some(b',' | b'}')) {
            return Err(self.unexpected("',' or '}'", c));
        }
        if c == Some(b'}') && self.nesting == Nesting::InsideEvent {
            // the nested close does not end the record
            self.nesting = Nesting::AtTop;
            c = self.scanner.source.peek(Skip::Whitespace)?;
            match c {
                Some(b'}') => self.scanner.source.advance(),
                Some(b',') => {}
                other => return Err(self.unexpected("',' or '}'", other)),
            }
        }
        if c == Some(b'}') {
            self.scanner.record += 1;
            self.fields_in_record = 0;
            if self.scanner.source.peek(Skip::Whitespace)? == Some(b']') {
                self.scanner.source.advance();
            }
            return Ok(FieldStep::LastField);
        }
        self.fields_in_record += 1;
        Ok(FieldStep::Field)
    }
}
