//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Read file contents as UTF-8 with standardized error handling.
///
/// Non-UTF-8 content surfaces as `internal.io_error` with the path in context.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))
}

/// Write content to file atomically (write to a sibling temp file, then rename).
///
/// Readers always see either the old content or the new content, never a
/// truncated file. Symlinks are written through: the link's target is
/// replaced and the link itself stays in place. An existing file keeps its
/// permissions.
pub fn write_file_atomic(path: &Path, content: &str, operation: &str) -> Result<()> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let permissions = fs::metadata(&target).ok().map(|m| m.permissions());

    let parent = target.parent().ok_or_else(|| {
        Error::internal_io(
            format!("Invalid path: {}", path.display()),
            Some(operation.to_string()),
        )
    })?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("{} (create temp)", operation)))
    })?;

    tmp.write_all(content.as_bytes()).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("{} (write temp)", operation)))
    })?;

    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("{} (set permissions)", operation)))
        })?;
    }

    // A failed persist drops the temp file, which removes it.
    tmp.persist(&target).map_err(|e| {
        Error::internal_io(e.error.to_string(), Some(format!("{} (rename)", operation)))
    })?;

    Ok(())
}

/// Move a file or directory, mapping failures to `internal.io_error`.
pub fn rename_path(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("rename {} -> {}", from.display(), to.display())),
        )
    })
}
