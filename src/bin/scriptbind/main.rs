//! scriptbind CLI - script binding generator for embedded interpreters

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};
use scriptbind::util::Shell;

/// Options shared by every command.
pub struct GlobalOptions {
    pub shell: Arc<Shell>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let shell = Shell::from_flags(
        cli.quiet,
        cli.verbose,
        cli.color,
        cli.message_format == MessageFormat::Json,
    );
    let global_opts = GlobalOptions {
        shell: Arc::new(shell),
    };

    if let Err(e) = run(cli.command, &global_opts) {
        global_opts.shell.error(format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    let filter = if cli.verbose {
        EnvFilter::new("scriptbind=debug")
    } else if cli.quiet {
        EnvFilter::new("scriptbind=error")
    } else {
        EnvFilter::new("scriptbind=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(command: Commands, global_opts: &GlobalOptions) -> Result<()> {
    match command {
        Commands::Generate(args) => commands::generate::execute(args, global_opts),
        Commands::Check(args) => commands::check::execute(args, global_opts),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
