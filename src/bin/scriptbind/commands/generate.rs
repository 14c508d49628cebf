//! `scriptbind generate` command

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::cli::GenerateArgs;
use crate::GlobalOptions;
use scriptbind::ops::{generate_bindings, ArtifactStatus, GenerateOptions, GenerateResult};
use scriptbind::util::config::{global_config_path, load_config, project_config_path};
use scriptbind::util::{Config, Status};

pub fn execute(args: GenerateArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let cwd = std::env::current_dir()?;

    let project_path = match &args.config {
        Some(path) if !path.exists() => bail!("config file not found: {}", path.display()),
        Some(path) => path.clone(),
        None => project_config_path(&cwd),
    };
    let config = load_config(global_config_path().as_deref(), &project_path);

    let opts = options_from_args(&args, &config, cwd);

    let span = shell.span(
        Status::Generating,
        format!("bindings from {}", opts.exports.display()),
    );
    let result = generate_bindings(&opts, &config)?;

    if shell.is_json() {
        shell.json_event(&serde_json::json!({
            "reason": "generate-finished",
            "result": serde_json::to_value(&result)?,
        }));
        return Ok(());
    }

    report(&result, global_opts);
    span.finish_with_message(format!(
        "{} routines, {} constants, {} stubs",
        result.routines, result.constants, result.stubs
    ));

    Ok(())
}

/// Combine flags with configuration; flags win.
fn options_from_args(args: &GenerateArgs, config: &Config, cwd: PathBuf) -> GenerateOptions {
    let out_dir = args
        .out_dir
        .clone()
        .or_else(|| config.generate.out_dir.clone())
        .unwrap_or(cwd);

    let mut opts = GenerateOptions::new(&args.exports, out_dir)
        .with_strict(args.strict || config.generate.strict)
        .with_dry_run(args.dry_run);
    if let Some(imports) = &args.imports {
        opts = opts.with_imports(imports);
    }
    opts
}

fn report(result: &GenerateResult, global_opts: &GlobalOptions) {
    let shell = &global_opts.shell;

    let skipped = result.skipped_count();
    if skipped > 0 {
        shell.warn(format!(
            "{} feed line(s) skipped; run `scriptbind check` for details",
            skipped
        ));
    }

    for artifact in &result.artifacts {
        let path = artifact.path.display();
        match artifact.status {
            ArtifactStatus::Written => shell.status(Status::Created, path),
            ArtifactStatus::Unchanged => shell.status(Status::Fresh, path),
            ArtifactStatus::DryRun => shell.status(
                Status::Info,
                format!("would write {} ({} bytes)", path, artifact.bytes),
            ),
        }
    }
}
