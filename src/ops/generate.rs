//! Binding generation operation.
//!
//! Streams the export feed and the optional import feed through their
//! generators and writes the glue source and both headers into the output
//! directory. Artifacts whose content did not change are left untouched.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::bindings::export::ExportGenerator;
use crate::bindings::glue::{guard_for, GlueAssembler, GlueOutput};
use crate::bindings::import::ImportGenerator;
use crate::bindings::parser::{DeclParser, FeedSummary};
use crate::ops::check::ensure_clean;
use crate::util::config::Config;
use crate::util::fs::write_if_changed;

/// Options for a generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Feed of native functions exposed to scripts
    pub exports: PathBuf,

    /// Feed of script functions called from native code
    pub imports: Option<PathBuf>,

    /// Directory receiving the artifacts
    pub out_dir: PathBuf,

    /// Fail before writing if any feed line was skipped
    pub strict: bool,

    /// Render but don't write
    pub dry_run: bool,
}

impl GenerateOptions {
    /// Create options for an export feed and output directory.
    pub fn new(exports: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        GenerateOptions {
            exports: exports.into(),
            imports: None,
            out_dir: out_dir.into(),
            strict: false,
            dry_run: false,
        }
    }

    /// Set the import feed.
    pub fn with_imports(mut self, imports: impl Into<PathBuf>) -> Self {
        self.imports = Some(imports.into());
        self
    }

    /// Set strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set dry run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Which artifact a file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Source,
    Header,
    ImportsHeader,
}

/// What happened to an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactStatus {
    /// Created or overwritten
    Written,
    /// Already held the generated content
    Unchanged,
    /// Rendered only
    DryRun,
}

/// A generated file.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub status: ArtifactStatus,
    pub bytes: usize,
}

/// Result of a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    /// Export feed counts and skipped lines
    pub exports: FeedSummary,

    /// Import feed counts and skipped lines
    pub imports: Option<FeedSummary>,

    /// Entries in the routine table
    pub routines: usize,

    /// Entries in the constant table
    pub constants: usize,

    /// Import stubs
    pub stubs: usize,

    /// Artifacts in source, header, imports header order
    pub artifacts: Vec<Artifact>,
}

impl GenerateResult {
    /// Skipped lines over both feeds.
    pub fn skipped_count(&self) -> usize {
        self.exports.skipped.len() + self.imports.as_ref().map_or(0, |s| s.skipped.len())
    }

    /// Number of artifacts that were written.
    pub fn written_count(&self) -> usize {
        self.artifacts
            .iter()
            .filter(|a| a.status == ArtifactStatus::Written)
            .count()
    }
}

/// Generate bindings from feed files into the output directory.
pub fn generate_bindings(opts: &GenerateOptions, config: &Config) -> Result<GenerateResult> {
    config.runtime.validate()?;

    let api = &config.runtime;
    let parser = DeclParser::new();

    tracing::debug!("parsing export feed {}", opts.exports.display());
    let mut export = ExportGenerator::new(api);
    let export_summary = parser.parse_file(&opts.exports, &mut export)?;
    warn_skipped(&opts.exports, &export_summary);

    let mut import = ImportGenerator::new(api);
    let import_summary = match &opts.imports {
        Some(path) => {
            tracing::debug!("parsing import feed {}", path.display());
            let summary = parser.parse_file(path, &mut import)?;
            warn_skipped(path, &summary);
            Some(summary)
        }
        None => None,
    };

    // nothing is written unless every feed is clean
    if opts.strict {
        ensure_clean(&opts.exports, &export_summary.skipped)?;
        if let (Some(path), Some(summary)) = (&opts.imports, &import_summary) {
            ensure_clean(path, &summary.skipped)?;
        }
    }

    let export = export.finish();
    let import = import.finish();
    let glue = assembler(config).assemble(&export, &import);

    let artifacts = write_artifacts(&glue, opts, config)?;

    Ok(GenerateResult {
        exports: export_summary,
        imports: import_summary,
        routines: export.routines.len(),
        constants: export.constants.len(),
        stubs: import.count,
        artifacts,
    })
}

/// Render bindings from in-memory feeds.
pub fn render_bindings(exports: &str, imports: &str, config: &Config) -> Result<GlueOutput> {
    config.runtime.validate()?;

    let api = &config.runtime;
    let parser = DeclParser::new();

    let mut export = ExportGenerator::new(api);
    parser.parse(exports.as_bytes(), &mut export)?;
    let mut import = ImportGenerator::new(api);
    parser.parse(imports.as_bytes(), &mut import)?;

    Ok(assembler(config).assemble(&export.finish(), &import.finish()))
}

fn assembler(config: &Config) -> GlueAssembler<'_> {
    let output = &config.output;
    let header_guard = output
        .header_guard
        .clone()
        .unwrap_or_else(|| guard_for(&output.header));
    let imports_guard = output
        .imports_guard
        .clone()
        .unwrap_or_else(|| guard_for(&output.imports_header));

    GlueAssembler::new(&config.runtime)
        .with_header_guard(header_guard)
        .with_imports_guard(imports_guard)
}

fn warn_skipped(path: &Path, summary: &FeedSummary) {
    for skipped in &summary.skipped {
        tracing::warn!(
            "{}:{}: {}: {}",
            path.display(),
            skipped.line,
            skipped.reason,
            skipped.text
        );
    }
}

fn write_artifacts(
    glue: &GlueOutput,
    opts: &GenerateOptions,
    config: &Config,
) -> Result<Vec<Artifact>> {
    let output = &config.output;
    let files = [
        (ArtifactKind::Source, &output.source, &glue.source),
        (ArtifactKind::Header, &output.header, &glue.header),
        (ArtifactKind::ImportsHeader, &output.imports_header, &glue.imports_header),
    ];

    let mut artifacts = Vec::with_capacity(files.len());
    for (kind, name, contents) in files {
        let path = opts.out_dir.join(name);

        let status = if opts.dry_run {
            ArtifactStatus::DryRun
        } else if write_if_changed(&path, contents)? {
            tracing::debug!("wrote {}", path.display());
            ArtifactStatus::Written
        } else {
            ArtifactStatus::Unchanged
        };

        artifacts.push(Artifact {
            kind,
            path,
            status,
            bytes: contents.len(),
        });
    }

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixtures, FeedDir};
    use crate::util::diagnostic::SkippedDeclarationsError;

    fn setup(exports: &str, imports: Option<&str>) -> (FeedDir, GenerateOptions) {
        let dir = FeedDir::new();
        let mut opts = GenerateOptions::new(dir.feed("export.h", exports), dir.path("gen"));
        if let Some(imports) = imports {
            opts = opts.with_imports(dir.feed("import.h", imports));
        }
        (dir, opts)
    }

    #[test]
    fn test_generate_writes_artifacts() {
        let (_dir, opts) = setup(fixtures::EXPORT_FEED, Some(fixtures::IMPORT_FEED));
        let result = generate_bindings(&opts, &Config::default()).unwrap();

        assert_eq!(result.written_count(), 3);
        assert_eq!(result.skipped_count(), 0);

        let source = std::fs::read_to_string(opts.out_dir.join("genbinds.c")).unwrap();
        assert!(source.contains("static int bind_MAX(lua_State *L)"));
        assert!(source.contains("void MaskAll(void)"));
        assert!(opts.out_dir.join("genbinds.h").is_file());
        assert!(opts.out_dir.join("genimports.h").is_file());
    }

    #[test]
    fn test_regeneration_is_byte_identical() {
        let (_dir, opts) = setup(fixtures::EXPORT_FEED, Some(fixtures::IMPORT_FEED));
        let config = Config::default();

        generate_bindings(&opts, &config).unwrap();
        let first = std::fs::read(opts.out_dir.join("genbinds.c")).unwrap();

        let result = generate_bindings(&opts, &config).unwrap();
        let second = std::fs::read(opts.out_dir.join("genbinds.c")).unwrap();

        assert_eq!(first, second);
        assert_eq!(result.written_count(), 0);
        assert!(result
            .artifacts
            .iter()
            .all(|a| a.status == ArtifactStatus::Unchanged));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (_dir, opts) = setup(fixtures::EXPORT_FEED, None);
        let opts = opts.with_dry_run(true);

        let result = generate_bindings(&opts, &Config::default()).unwrap();

        assert!(result
            .artifacts
            .iter()
            .all(|a| a.status == ArtifactStatus::DryRun && a.bytes > 0));
        assert!(!opts.out_dir.exists());
    }

    #[test]
    fn test_counts() {
        let (_dir, opts) = setup(
            "#define SCREEN_W\n#define SCREEN_H\nint f (int x);\nvoid g (void); /* CODE */\n",
            Some("void h (void);\n"),
        );

        let result = generate_bindings(&opts, &Config::default()).unwrap();
        assert_eq!(result.routines, 2);
        assert_eq!(result.constants, 2);
        assert_eq!(result.stubs, 1);
    }

    #[test]
    fn test_skipped_lines_do_not_stop_generation() {
        let (_dir, opts) = setup(fixtures::MALFORMED_FEED, None);

        let result = generate_bindings(&opts, &Config::default()).unwrap();
        assert_eq!(result.skipped_count(), 2);
        assert_eq!(result.written_count(), 3);
    }

    #[test]
    fn test_strict_rejects_before_writing() {
        let (_dir, opts) = setup(fixtures::MALFORMED_FEED, None);
        let opts = opts.with_strict(true);

        let err = generate_bindings(&opts, &Config::default()).unwrap_err();

        let skipped = err.downcast_ref::<SkippedDeclarationsError>().unwrap();
        assert_eq!(skipped.count, 2);
        assert!(!opts.out_dir.exists());
    }

    #[test]
    fn test_missing_feed() {
        let (dir, _) = setup("", None);
        let opts = GenerateOptions::new(dir.path("missing.h"), dir.path("gen"));

        let err = generate_bindings(&opts, &Config::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to read feed"));
    }

    #[test]
    fn test_invalid_runtime_name() {
        let (_dir, opts) = setup(fixtures::EXPORT_FEED, None);
        let mut config = Config::default();
        config.runtime.state_var = "L L".to_string();

        assert!(generate_bindings(&opts, &config).is_err());
        assert!(!opts.out_dir.exists());
    }

    #[test]
    fn test_configured_names_and_guards() {
        let (_dir, opts) = setup(fixtures::EXPORT_FEED, None);
        let mut config = Config::default();
        config.output.source = "luabinds.c".to_string();
        config.output.header = "luabinds.h".to_string();
        config.output.imports_guard = Some("SCRIPT_IMPORTS".to_string());

        generate_bindings(&opts, &config).unwrap();

        assert!(opts.out_dir.join("luabinds.c").is_file());
        let header = std::fs::read_to_string(opts.out_dir.join("luabinds.h")).unwrap();
        assert!(header.contains("#ifndef LUABINDS_H\n"));
        let imports = std::fs::read_to_string(opts.out_dir.join("genimports.h")).unwrap();
        assert!(imports.contains("#ifndef SCRIPT_IMPORTS\n"));
    }

    #[test]
    fn test_render_matches_generate() {
        let (_dir, opts) = setup(fixtures::EXPORT_FEED, Some(fixtures::IMPORT_FEED));
        let config = Config::default();

        generate_bindings(&opts, &config).unwrap();
        let rendered =
            render_bindings(fixtures::EXPORT_FEED, fixtures::IMPORT_FEED, &config).unwrap();

        let source = std::fs::read_to_string(opts.out_dir.join("genbinds.c")).unwrap();
        assert_eq!(source, rendered.source);
    }
}
