// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON value kinds and the typed values a row cursor hands out.

use serde::Serialize;
use std::fmt;

/// Kind of a scalar JSON value as recognized by the token scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonKind {
    /// Quoted string
    String,
    /// Numeric literal (permissive character class)
    Number,
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    #[default]
    Null,
}

impl JsonKind {
    /// Lowercase name of the kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
        }
    }

    /// Whether a metric column may hold this kind
    #[must_use]
    pub const fn is_numeric_or_null(self) -> bool {
        matches!(self, Self::Number | Self::Null)
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed column value for the current row
///
/// Text borrows from the cursor's column buffer and is valid until the cursor
/// advances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValue<'a> {
    /// Escape-expanded text of a non-metric column
    Text(&'a str),
    /// Decimal value of a metric column
    Number(f64),
    /// Absent column, or JSON `null` in a metric column
    Null,
}

impl ColumnValue<'_> {
    /// Whether this is [`ColumnValue::Null`]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert to an owned JSON value
    ///
    /// Non-finite numbers become `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(s) => serde_json::Value::String((*s).to_string()),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Null => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for ColumnValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Null => Ok(()),
        }
    }
}

/// Parse permissive numeric text the way C `strtod` does
///
/// The longest prefix that forms a decimal literal wins; text with no such
/// prefix yields `0.0`.
#[must_use]
pub fn parse_decimal_prefix(text: &str) -> f64 {
    let end = decimal_prefix_len(text.as_bytes());
    // the prefix is ASCII, so `end` is a char boundary
    text[..end].parse().unwrap_or(0.0)
}

/// Length of the longest `[+-]digits[.digits][(e|E)[+-]digits]` prefix
///
/// At least one mantissa digit is required. An exponent marker is only
/// taken when digits follow it.
fn decimal_prefix_len(bytes: &[u8]) -> usize {
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int = digits(end);
    end += int;
    let mut frac = 0;
    if bytes.get(end) == Some(&b'.') {
        frac = digits(end + 1);
        if int + frac > 0 {
            end += 1 + frac;
        }
    }
    if int + frac == 0 {
        return 0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let n = digits(exp);
        if n > 0 {
            end = exp + n;
        }
    }
    end
}
