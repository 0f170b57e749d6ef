// SPDX-License-Identifier: MIT OR Apache-2.0
//! Token scanner for the JSON scalars found in Druid result records
//!
//! Strings are escape-expanded into the label or value buffer. Numbers are
//! taken greedily from a permissive character class and kept as raw text.
//! `\u` escapes are kept verbatim as the six bytes `\uXXXX`.

use crate::buffer;
use crate::classify::{is_number_char, starts_number};
use crate::source::{ByteSource, Skip, show};
use druidjson_core::{JsonKind, ReaderOptions, Result};
use std::io::{Read, Seek};

const LABEL: &str = "label";
const VALUE: &str = "value";

/// Which accumulation buffer a string is read into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Field label
    Label,
    /// Field value
    Value,
}

/// Byte source plus the label/value accumulation buffers
#[derive(Debug)]
pub struct Scanner<R> {
    pub(crate) source: ByteSource<R>,
    pub(crate) record: usize,
    label: Vec<u8>,
    value: Vec<u8>,
    kind: JsonKind,
}

impl<R: Read + Seek> Scanner<R> {
    /// Scanner over `inner`
    pub fn new(inner: R, options: ReaderOptions) -> Self {
        Self::from_source(ByteSource::new(inner, options))
    }

    /// Scanner over an existing byte source
    pub const fn from_source(source: ByteSource<R>) -> Self {
        Self {
            source,
            record: 0,
            label: Vec::new(),
            value: Vec::new(),
            kind: JsonKind::Null,
        }
    }

    /// Last label read
    #[must_use]
    pub fn label(&self) -> &[u8] {
        &self.label
    }

    /// Raw text of the last value read
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Kind of the last value read
    #[must_use]
    pub const fn kind(&self) -> JsonKind {
        self.kind
    }

    /// Forget the last label and value
    pub fn clear(&mut self) {
        self.label.clear();
        self.value.clear();
        self.kind = JsonKind::Null;
    }

    /// Read the remainder of a string whose opening quote was consumed
    ///
    /// # Errors
    ///
    /// Returns a parse error on an unknown escape or end of input.
    pub fn read_string(&mut self, target: Target) -> Result<()> {
        let (buf, what) = match target {
            Target::Label => (&mut self.label, LABEL),
            Target::Value => (&mut self.value, VALUE),
        };
        loop {
            match self.source.copy_until_quote_or_escape(buf, what)? {
                Some(b'"') => return Ok(()),
                Some(_) => {
                    let Some(esc) = self.source.bump(Skip::Nothing)? else {
                        return Err(self
                            .source
                            .error(self.record, "unexpected end of input in escape"));
                    };
                    match esc {
                        b'"' | b'\\' | b'/' => buffer::push(buf, esc, what)?,
                        b'b' => buffer::push(buf, 0x08, what)?,
                        b'n' => buffer::push(buf, b'\n', what)?,
                        b'r' => buffer::push(buf, b'\r', what)?,
                        b't' => buffer::push(buf, b'\t', what)?,
                        // hex digits follow as ordinary bytes
                        b'u' => buffer::extend(buf, b"\\u", what)?,
                        other => {
                            return Err(self.source.error(
                                self.record,
                                format!("unexpected escape char '\\{}'", show(other)),
                            ));
                        }
                    }
                }
                None => {
                    return Err(self
                        .source
                        .error(self.record, "unexpected end of input in string"));
                }
            }
        }
    }

    /// Match the rest of `word` after its first byte was consumed
    ///
    /// # Errors
    ///
    /// Returns a parse error naming the unexpected character.
    pub fn consume_literal(&mut self, first: u8, word: &'static str) -> Result<()> {
        buffer::push(&mut self.value, first, VALUE)?;
        for &expected in &word.as_bytes()[1..] {
            let got = self.source.bump(Skip::Nothing)?;
            if let Some(c) = got {
                buffer::push(&mut self.value, c, VALUE)?;
            }
            if got != Some(expected) {
                let found = got.map_or_else(|| "end of input".to_string(), |c| {
                    format!("'{}' character", show(c))
                });
                return Err(self.source.error(
                    self.record,
                    format!("consume_literal: unexpected {found} (expected '{word}')"),
                ));
            }
        }
        Ok(())
    }

    /// Greedily take bytes from the numeric class after `first`
    ///
    /// # Errors
    ///
    /// Fails only on read or allocation errors.
    pub fn consume_number(&mut self, first: u8) -> Result<()> {
        buffer::push(&mut self.value, first, VALUE)?;
        while let Some(c) = self.source.peek(Skip::Nothing)? {
            if !is_number_char(c) {
                break;
            }
            self.source.advance();
            buffer::push(&mut self.value, c, VALUE)?;
        }
        Ok(())
    }

    /// Read one scalar value, dispatching on its first byte
    ///
    /// # Errors
    ///
    /// Returns a parse error for any lookahead that cannot start a scalar.
    pub fn read_value(&mut self) -> Result<JsonKind> {
        self.value.clear();
        let Some(c) = self.source.bump(Skip::Whitespace)? else {
            return Err(self
                .source
                .error(self.record, "read_value: unexpected end of input"));
        };
        let kind = match c {
            b'"' => {
                self.read_string(Target::Value)?;
                JsonKind::String
            }
            b'n' => {
                self.consume_literal(c, "null")?;
                JsonKind::Null
            }
            b't' => {
                self.consume_literal(c, "true")?;
                JsonKind::True
            }
            b'f' => {
                self.consume_literal(c, "false")?;
                JsonKind::False
            }
            _ if starts_number(c) => {
                self.consume_number(c)?;
                JsonKind::Number
            }
            _ => {
                return Err(self.source.error(
                    self.record,
                    format!("read_value: unexpected '{}' character", show(c)),
                ));
            }
        };
        self.kind = kind;
        Ok(kind)
    }
}
