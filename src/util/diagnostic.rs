//! User-friendly diagnostic messages.
//!
//! Every error names the root cause and, where there is one, a suggested fix.

use std::fmt;
use std::path::{Path, PathBuf};

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::bindings::parser::{SkipReason, SkippedLine};

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion for a line outside the declaration grammar.
    pub const UNRECOGNIZED_LINE: &str =
        "write one prototype per line, `#define NAME` for constants, or comment the line out";

    /// Suggestion for a parameter outside the argument grammar.
    pub const INVALID_PARAMETER: &str =
        "parameters must be `[const] type [*|&] [name]`; wrap unsupported types in a typedef";

    /// Suggestion when strict mode rejects a feed.
    pub const STRICT_MODE: &str = "help: Run `scriptbind check <feed>` to list every skipped line";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path and 1-based line)
    pub location: Option<(PathBuf, Option<usize>)>,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>, line: Option<usize>) -> Self {
        self.location = Some((path.into(), line));
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        match &self.location {
            Some((path, Some(line))) => {
                output.push_str(&format!("  --> {}:{}\n", path.display(), line))
            }
            Some((path, None)) => output.push_str(&format!("  --> {}\n", path.display())),
            None => {}
        }

        for ctx in &self.context {
            output.push_str(&format!("   | {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            for suggestion in &self.suggestions {
                output.push_str(&format!("  = {}: {}\n", help_prefix, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Warning for a feed line that contributed no declaration.
pub fn skipped_line_warning(path: &Path, skipped: &SkippedLine) -> Diagnostic {
    let suggestion = match skipped.reason {
        SkipReason::Unrecognized => suggestions::UNRECOGNIZED_LINE,
        SkipReason::InvalidParameter { .. } => suggestions::INVALID_PARAMETER,
    };

    Diagnostic::warning(format!("skipped line: {}", skipped.reason))
        .with_location(path, Some(skipped.line))
        .with_context(&skipped.text)
        .with_suggestion(suggestion)
}

/// A configured runtime name is not a C identifier.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("`{value}` is not a valid identifier for `runtime.{field}`")]
#[diagnostic(
    code(scriptbind::config::invalid_identifier),
    help("identifiers start with a letter or `_` and contain only letters, digits and `_`")
)]
pub struct InvalidIdentifierError {
    pub field: String,
    pub value: String,
}

impl InvalidIdentifierError {
    pub fn new(field: &str, value: &str) -> Self {
        InvalidIdentifierError {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Strict mode found lines that contributed no declaration.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("{count} line(s) of `{path}` were skipped")]
#[diagnostic(
    code(scriptbind::parse::skipped_declarations),
    help("fix or comment out the skipped lines, or generate without --strict")
)]
pub struct SkippedDeclarationsError {
    pub path: String,
    pub count: usize,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("first skipped line")]
    pub span: SourceSpan,
}

impl SkippedDeclarationsError {
    /// Build the error for `skipped` lines of a feed, labelling the first one.
    pub fn new(path: &Path, content: String, skipped: &[SkippedLine]) -> Self {
        let span = skipped
            .first()
            .map(|first| line_span(&content, first.line, &first.text))
            .unwrap_or_else(|| (0, 0).into());
        let name = path.display().to_string();

        SkippedDeclarationsError {
            path: name.clone(),
            count: skipped.len(),
            src: NamedSource::new(name, content),
            span,
        }
    }
}

/// Byte span of `text` within 1-based line `line` of `content`.
fn line_span(content: &str, line: usize, text: &str) -> SourceSpan {
    let start: usize = content
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let line_text = content[start..].lines().next().unwrap_or("");
    let indent = line_text.find(text).unwrap_or(0);

    (start + indent, text.len()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::warning("skipped line: unrecognized declaration")
            .with_location("export.h", Some(12))
            .with_context("typedef int Handle;")
            .with_suggestion("comment the line out");

        let output = diag.format(false);
        assert!(output.starts_with("warning: skipped line"));
        assert!(output.contains("  --> export.h:12\n"));
        assert!(output.contains("   | typedef int Handle;\n"));
        assert!(output.contains("  = help: comment the line out\n"));
    }

    #[test]
    fn test_skipped_line_warning() {
        let skipped = SkippedLine {
            line: 3,
            text: "void f (int x, ...);".to_string(),
            reason: SkipReason::InvalidParameter { position: 2 },
        };
        let diag = skipped_line_warning(Path::new("export.h"), &skipped);

        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.message, "skipped line: unsupported parameter #2");
        assert_eq!(diag.suggestions, vec![suggestions::INVALID_PARAMETER]);
    }

    #[test]
    fn test_skipped_declarations_span() {
        let content = "void a (void);\n  typedef int X;\nvoid b (void);\n".to_string();
        let skipped = vec![SkippedLine {
            line: 2,
            text: "typedef int X;".to_string(),
            reason: SkipReason::Unrecognized,
        }];

        let err = SkippedDeclarationsError::new(Path::new("export.h"), content, &skipped);
        assert_eq!(err.count, 1);
        assert_eq!(err.span.offset(), 17);
        assert_eq!(err.span.len(), 14);
        assert_eq!(err.to_string(), "1 line(s) of `export.h` were skipped");
    }

    #[test]
    fn test_invalid_identifier_message() {
        let err = InvalidIdentifierError::new("state_var", "my state");
        assert_eq!(
            err.to_string(),
            "`my state` is not a valid identifier for `runtime.state_var`"
        );
    }
}
