// SPDX-License-Identifier: MIT OR Apache-2.0
//! Byte classification tables.

const fn table(members: &[u8]) -> [bool; 256] {
    let mut t = [false; 256];
    let mut i = 0;
    while i < members.len() {
        t[members[i] as usize] = true;
        i += 1;
    }
    t
}

const SPACE: [bool; 256] = table(b" \t\n\r");
const SPACE_OR_PREFIX: [bool; 256] = table(b" \t\n\r,{[");
// superset of JSON number syntax; validation is left to the decimal parser
const NUMBER: [bool; 256] = table(b"0123456789.eE-+");

/// JSON insignificant whitespace
#[inline]
#[must_use]
pub const fn is_space(b: u8) -> bool {
    SPACE[b as usize]
}

/// Whitespace or structural punctuation skipped before a field label
#[inline]
#[must_use]
pub const fn is_space_or_prefix(b: u8) -> bool {
    SPACE_OR_PREFIX[b as usize]
}

/// Member of the permissive numeric character class
#[inline]
#[must_use]
pub const fn is_number_char(b: u8) -> bool {
    NUMBER[b as usize]
}

/// Byte that may open a numeric literal
#[inline]
#[must_use]
pub const fn starts_number(b: u8) -> bool {
    matches!(b, b'-' | b'.' | b'0'..=b'9')
}
