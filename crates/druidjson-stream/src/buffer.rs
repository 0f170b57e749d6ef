// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fallible growth for the reusable byte buffers.
//!
//! Allocation errors leave the position empty; callers fill it in with
//! [`DruidError::positioned`].

use druidjson_core::{DruidError, Result};

/// Append `bytes`, reporting allocation failure instead of aborting
pub fn extend(buf: &mut Vec<u8>, bytes: &[u8], what: &'static str) -> Result<()> {
    buf.try_reserve(bytes.len())
        .map_err(|_| DruidError::Allocation {
            record: 0,
            offset: 0,
            what,
            requested: buf.len().saturating_add(bytes.len()),
        })?;
    buf.extend_from_slice(bytes);
    Ok(())
}

/// Append a single byte
pub fn push(buf: &mut Vec<u8>, byte: u8, what: &'static str) -> Result<()> {
    extend(buf, &[byte], what)
}

/// Replace the contents of `buf` with `bytes`, keeping its capacity
pub fn assign(buf: &mut Vec<u8>, bytes: &[u8], what: &'static str) -> Result<()> {
    buf.clear();
    extend(buf, bytes, what)
}
