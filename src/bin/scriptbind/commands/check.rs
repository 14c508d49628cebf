//! `scriptbind check` command

use anyhow::Result;

use crate::cli::CheckArgs;
use crate::GlobalOptions;
use scriptbind::ops::{check_feeds, ensure_clean, FeedReport};
use scriptbind::util::diagnostic::skipped_line_warning;
use scriptbind::util::Status;

pub fn execute(args: CheckArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;

    let reports = check_feeds(&args.feeds)?;

    for report in &reports {
        if shell.is_json() {
            shell.json_event(&serde_json::json!({
                "reason": "feed-checked",
                "report": serde_json::to_value(report)?,
            }));
        } else {
            print_report(report, global_opts);
        }
    }

    if args.strict {
        for report in &reports {
            ensure_clean(&report.path, &report.skipped)?;
        }
    }

    Ok(())
}

fn print_report(report: &FeedReport, global_opts: &GlobalOptions) {
    let shell = &global_opts.shell;

    shell.status(Status::Checking, report.path.display());
    for skipped in &report.skipped {
        let diag = skipped_line_warning(&report.path, skipped);
        shell.print_block(diag.format(shell.use_color()));
    }
    for name in &report.duplicates {
        shell.warn(format!("`{}` is declared more than once", name));
    }

    let status = if report.is_clean() {
        Status::Finished
    } else {
        Status::Skipped
    };
    shell.status(
        status,
        format!(
            "{} functions, {} constants, {} skipped line(s)",
            report.functions.len(),
            report.constants.len(),
            report.skipped.len()
        ),
    );
}
