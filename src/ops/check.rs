//! Feed checking operation.
//!
//! Parses feeds without generating anything and reports what each one
//! declares and which lines were skipped.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::bindings::parser::{DeclParser, ParsedFeed, SkippedLine};
use crate::bindings::registry::RoutineTable;
use crate::util::diagnostic::SkippedDeclarationsError;
use crate::util::fs::read_to_string;

/// What a feed declares.
#[derive(Debug, Clone, Serialize)]
pub struct FeedReport {
    pub path: PathBuf,

    /// Lines read
    pub lines: usize,

    /// Function names in feed order
    pub functions: Vec<String>,

    /// Constant names in feed order
    pub constants: Vec<String>,

    /// Function names declared more than once
    pub duplicates: Vec<String>,

    pub skipped: Vec<SkippedLine>,
}

impl FeedReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Parse one feed and report on it.
pub fn check_feed(path: &Path) -> Result<FeedReport> {
    let mut feed = ParsedFeed::default();
    let summary = DeclParser::new().parse_file(path, &mut feed)?;

    let mut routines = RoutineTable::new();
    for decl in feed.functions() {
        routines.push(&decl.name);
    }

    let mut duplicates: Vec<String> = Vec::new();
    for name in routines.iter() {
        if routines.occurrences(name) > 1 && !duplicates.iter().any(|d| d == name) {
            duplicates.push(name.to_string());
        }
    }

    Ok(FeedReport {
        path: path.to_path_buf(),
        lines: summary.lines,
        functions: routines.iter().map(str::to_string).collect(),
        constants: feed.constants().map(|c| c.name.clone()).collect(),
        duplicates,
        skipped: summary.skipped,
    })
}

/// Parse every feed in order.
pub fn check_feeds(paths: &[PathBuf]) -> Result<Vec<FeedReport>> {
    paths.iter().map(|path| check_feed(path)).collect()
}

/// Fail with a labelled diagnostic if any line of the feed at `path` was skipped.
pub fn ensure_clean(path: &Path, skipped: &[SkippedLine]) -> Result<()> {
    if skipped.is_empty() {
        return Ok(());
    }

    let content = read_to_string(path)?;
    Err(SkippedDeclarationsError::new(path, content, skipped).into())
}
