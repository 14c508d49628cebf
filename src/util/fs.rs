//! Filesystem utilities.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::util::hash;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Write `contents` unless the file already holds them.
///
/// Returns `true` if the file was written. An untouched file keeps its
/// modification time, so build systems do not rebuild dependents.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<bool> {
    if hash::matches_file(path, contents)? {
        tracing::debug!("{} is up to date", path.display());
        return Ok(false);
    }

    write_string(path, contents)?;
    Ok(true)
}
