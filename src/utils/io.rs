//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

fn io_error(e: std::io::Error, operation: &str, path: &Path) -> Error {
    Error::internal_io(
        e.to_string(),
        Some(format!("{} {}", operation, path.display())),
    )
}

/// Read file contents with standardized error handling.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| io_error(e, operation, path))
}

/// Write content to file with standardized error handling.
pub fn write_file(path: &Path, content: &str, operation: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| io_error(e, operation, path))
}

/// Create a directory and all of its parents.
pub fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| io_error(e, "create", path))
}

/// Remove a directory tree if it exists. Returns whether anything was removed.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(path).map_err(|e| io_error(e, "remove", path))?;
    Ok(true)
}

/// Delete `path` if present, then recreate it empty.
pub fn recreate_dir(path: &Path) -> Result<bool> {
    let removed = remove_dir_if_exists(path)?;
    create_dir_all(path)?;
    Ok(removed)
}

pub fn rename(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("rename {} -> {}", from.display(), to.display())),
        )
    })
}

pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).map(|_| ()).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("copy {} -> {}", from.display(), to.display())),
        )
    })
}

/// Recursively copy the directory `from` to `to`. `to` must not exist yet.
pub fn copy_dir_recursive(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir(to).map_err(|e| io_error(e, "create", to))?;

    let entries = fs::read_dir(from).map_err(|e| io_error(e, "read dir", from))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_error(e, "read dir", from))?;
        let source = entry.path();
        let target = to.join(entry.file_name());
        // Follows symlinks, so a linked directory is copied as a directory.
        let metadata = fs::metadata(&source).map_err(|e| io_error(e, "stat", &source))?;

        if metadata.is_dir() {
            copy_dir_recursive(&source, &target)?;
        } else {
            copy_file(&source, &target)?;
        }
    }

    Ok(())
}
