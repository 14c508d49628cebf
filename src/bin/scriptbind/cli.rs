//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use scriptbind::util::ColorChoice;

/// scriptbind - script binding generator for embedded interpreters
#[derive(Parser)]
#[command(name = "scriptbind")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Output format for messages
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate glue source and headers from declaration feeds
    Generate(GenerateArgs),

    /// Parse feeds and report skipped lines without generating
    Check(CheckArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Feed of native functions exposed to scripts
    #[arg(long, short = 'e', value_name = "FILE")]
    pub exports: PathBuf,

    /// Feed of script functions called from native code
    #[arg(long, short = 'i', value_name = "FILE")]
    pub imports: Option<PathBuf>,

    /// Output directory (defaults to the config value, then the current directory)
    #[arg(long, short = 'o', value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Configuration file (defaults to ./scriptbind.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fail without writing if any feed line is skipped
    #[arg(long)]
    pub strict: bool,

    /// Show what would be written without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Feeds to check
    #[arg(required = true, value_name = "FEED")]
    pub feeds: Vec<PathBuf>,

    /// Exit with an error if any line is skipped
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
