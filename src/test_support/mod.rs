//! Test utilities for scriptbind unit tests.

pub mod fixtures;

use std::path::PathBuf;

use tempfile::TempDir;

/// A temporary project directory holding feed files.
pub struct FeedDir {
    dir: TempDir,
}

impl FeedDir {
    /// Create an empty project directory.
    pub fn new() -> Self {
        FeedDir {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// Write a feed file and return its path.
    pub fn feed(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("failed to write feed");
        path
    }

    /// Path of a file inside the directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

impl Default for FeedDir {
    fn default() -> Self {
        Self::new()
    }
}
