//! Declaration feed parser.
//!
//! Reads a feed line by line and streams every recognized declaration to a
//! [`DeclarationSink`] as soon as its line is classified. Lines that match no
//! rule are skipped, as before, but each skip is reported to the sink and
//! collected in the [`FeedSummary`] so callers can surface them.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::grammar::{self, Argument, LineKind, Prototype};
use super::types::{ConstantDecl, Declaration, FunctionDecl, Param, TypeSpec};

/// Receives declarations in feed order.
pub trait DeclarationSink {
    /// A function prototype was recognized.
    fn function(&mut self, decl: FunctionDecl);

    /// A `#define NAME` constant was recognized.
    fn constant(&mut self, decl: ConstantDecl);

    /// A line contributed nothing.
    fn skipped(&mut self, _line: &SkippedLine) {}
}

/// Why a line contributed no declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum SkipReason {
    /// Matches no rule of the line grammar
    Unrecognized,
    /// Looks like a prototype but an argument (1-based) is not in the grammar
    InvalidParameter { position: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unrecognized => write!(f, "unrecognized declaration"),
            SkipReason::InvalidParameter { position } => {
                write!(f, "unsupported parameter #{}", position)
            }
        }
    }
}

/// A feed line that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    /// 1-based line number
    pub line: usize,

    /// Line text, trimmed
    pub text: String,

    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Result of classifying one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Matched(Declaration),
    Comment,
    Blank,
    Skipped(SkippedLine),
}

/// Counts for a parsed feed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedSummary {
    /// Lines read
    pub lines: usize,

    /// Function prototypes streamed to the sink
    pub functions: usize,

    /// Constants streamed to the sink
    pub constants: usize,

    /// Lines that contributed nothing
    pub skipped: Vec<SkippedLine>,
}

impl FeedSummary {
    /// Check whether every non-comment line was understood.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A fully collected feed.
#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    /// Declarations in feed order
    pub declarations: Vec<Declaration>,

    /// Skipped lines in feed order
    pub skipped: Vec<SkippedLine>,
}

impl ParsedFeed {
    /// Function declarations in feed order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Function(f) => Some(f),
            Declaration::Constant(_) => None,
        })
    }

    /// Constant declarations in feed order.
    pub fn constants(&self) -> impl Iterator<Item = &ConstantDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Constant(c) => Some(c),
            Declaration::Function(_) => None,
        })
    }
}

impl DeclarationSink for ParsedFeed {
    fn function(&mut self, decl: FunctionDecl) {
        self.declarations.push(Declaration::Function(decl));
    }

    fn constant(&mut self, decl: ConstantDecl) {
        self.declarations.push(Declaration::Constant(decl));
    }

    fn skipped(&mut self, line: &SkippedLine) {
        self.skipped.push(line.clone());
    }
}

/// Parser for declaration feeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclParser;

impl DeclParser {
    /// Create a new parser.
    pub fn new() -> Self {
        DeclParser
    }

    /// Parse a feed file, streaming declarations into `sink`.
    pub fn parse_file<S: DeclarationSink>(&self, path: &Path, sink: &mut S) -> Result<FeedSummary> {
        let file = File::open(path)
            .with_context(|| format!("failed to read feed: {}", path.display()))?;

        self.parse(BufReader::new(file), sink)
            .with_context(|| format!("failed to read feed: {}", path.display()))
    }

    /// Parse a feed from any buffered reader.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD, so a feed
    /// with Latin-1 comments still parses line by line.
    pub fn parse<R: BufRead, S: DeclarationSink>(
        &self,
        mut reader: R,
        sink: &mut S,
    ) -> Result<FeedSummary> {
        let mut summary = FeedSummary::default();
        let mut buf = Vec::new();
        let mut line_no = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);
            self.feed_line(line_no, line, sink, &mut summary);
        }

        Ok(summary)
    }

    /// Parse in-memory feed text and collect everything.
    pub fn parse_str(&self, content: &str) -> ParsedFeed {
        let mut feed = ParsedFeed::default();
        let mut summary = FeedSummary::default();

        for (idx, line) in content.lines().enumerate() {
            self.feed_line(idx + 1, line, &mut feed, &mut summary);
        }

        feed
    }

    fn feed_line<S: DeclarationSink>(
        &self,
        line_no: usize,
        line: &str,
        sink: &mut S,
        summary: &mut FeedSummary,
    ) {
        summary.lines += 1;

        match self.parse_line(line_no, line) {
            LineOutcome::Matched(Declaration::Function(decl)) => {
                tracing::debug!("line {}: function `{}`", line_no, decl.name);
                summary.functions += 1;
                sink.function(decl);
            }
            LineOutcome::Matched(Declaration::Constant(decl)) => {
                tracing::debug!("line {}: constant `{}`", line_no, decl.name);
                summary.constants += 1;
                sink.constant(decl);
            }
            LineOutcome::Skipped(skipped) => {
                tracing::debug!("line {}: skipped ({})", line_no, skipped.reason);
                sink.skipped(&skipped);
                summary.skipped.push(skipped);
            }
            LineOutcome::Comment | LineOutcome::Blank => {}
        }
    }

    /// Classify one line and build its declaration.
    pub fn parse_line(&self, line_no: usize, line: &str) -> LineOutcome {
        let skip = |reason: SkipReason| {
            LineOutcome::Skipped(SkippedLine {
                line: line_no,
                text: line.trim().to_string(),
                reason,
            })
        };

        match grammar::classify(line) {
            LineKind::Comment => LineOutcome::Comment,
            LineKind::Blank => LineOutcome::Blank,
            LineKind::Constant(name) => LineOutcome::Matched(Declaration::Constant(ConstantDecl {
                name: name.to_string(),
                line: line_no,
            })),
            LineKind::Prototype(proto) => match self.build_function(&proto) {
                Ok(mut decl) => {
                    decl.line = line_no;
                    LineOutcome::Matched(Declaration::Function(decl))
                }
                Err(position) => skip(SkipReason::InvalidParameter { position }),
            },
            LineKind::Unrecognized => skip(SkipReason::Unrecognized),
        }
    }

    /// Build a function from a matched prototype.
    ///
    /// Fails with the position of the first argument outside the grammar.
    fn build_function(&self, proto: &Prototype<'_>) -> Result<FunctionDecl, usize> {
        let params = grammar::split_arguments(proto.args)?
            .into_iter()
            .map(param_from_argument)
            .collect();

        let return_type = proto
            .return_base
            .map(|base| TypeSpec::new(base, proto.return_indirection).with_const(proto.is_const))
            .filter(|ty| !ty.is_void());

        Ok(FunctionDecl {
            name: proto.name.to_string(),
            return_type,
            params,
            annotation: proto.annotation.trim().to_string(),
            line: 0,
        })
    }
}

fn param_from_argument(arg: Argument<'_>) -> Param {
    Param {
        ty: TypeSpec::new(arg.base, arg.indirection).with_const(arg.is_const),
        name: arg.name.map(str::to_string),
    }
}
