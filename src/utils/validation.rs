//! Input validation primitives.
//!
//! Helpers that replace verbose `ok_or_else` + `Error::validation_invalid_argument`
//! chains.

use crate::error::{Error, Result};

/// Require a string to be non-empty after trimming.
///
/// Returns a reference to the trimmed string on success.
pub fn require_non_empty<'a>(value: &'a str, field: &str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::validation_invalid_argument(field, message, None))
    } else {
        Ok(trimmed)
    }
}

/// Require a collection to be non-empty.
pub fn require_non_empty_vec<'a, T>(vec: &'a [T], field: &str, message: &str) -> Result<&'a [T]> {
    if vec.is_empty() {
        Err(Error::validation_invalid_argument(field, message, None))
    } else {
        Ok(vec)
    }
}

/// Require a single path segment: non-empty, no separators, not `.`/`..`.
pub fn require_segment<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = require_non_empty(value, field, "Cannot be empty")?;
    if trimmed.contains('/') || trimmed.contains('\\') || trimmed == "." || trimmed == ".." {
        return Err(Error::validation_invalid_argument(
            field,
            format!("'{}' must be a single file or folder name", trimmed),
            None,
        ));
    }
    Ok(trimmed)
}
