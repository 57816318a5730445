//! Shared helpers for command handlers.

use std::io::{self, IsTerminal};
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use confgrid_core::{BatchReport, CancelToken, batch, discover};

use crate::cli::GlobalOpts;
use crate::config::InputSettings;
use crate::error::CliError;
use crate::xlsx::ConflictPolicy;

/// Discover, extract and merge every configuration under the input dir.
///
/// Fails when nothing in the directory turned out to be a configuration.
pub fn run_batch(
    settings: &InputSettings,
    global: &GlobalOpts,
    cancel: &CancelToken,
) -> Result<BatchReport, CliError> {
    let files = discover::find_files(&settings.dir, &settings.filter, settings.case_sensitive)?;
    tracing::info!(dir = %settings.dir.display(), files = files.len(), "reading configurations");

    let progress = progress_bar(files.len(), global.quiet);
    let report = batch::run_with_progress(&files, &settings.run, cancel, |path: &Path| {
        if let Some(name) = path.file_name() {
            progress.set_message(name.to_string_lossy().into_owned());
        }
        progress.inc(1);
    });
    progress.finish_and_clear();
    let report = report?;

    if report.inventory.is_empty() {
        return Err(CliError::NoConfigurations {
            dir: settings.dir.clone(),
            filter: settings.filter.clone(),
        });
    }
    Ok(report)
}

fn progress_bar(len: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(u64::try_from(len).unwrap_or(u64::MAX));
    let style = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

/// How the workbook sink reacts to a locked output file.
///
/// `--yes` retries a few times without asking; an interactive terminal
/// prompts; anything else fails straight away.
pub fn conflict_policy(global: &GlobalOpts) -> ConflictPolicy {
    if global.yes {
        ConflictPolicy::Retry {
            attempts: 5,
            delay: Duration::from_secs(1),
        }
    } else if io::stdin().is_terminal() && io::stderr().is_terminal() {
        ConflictPolicy::Prompt
    } else {
        ConflictPolicy::Fail
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "--yes".into(),
            reason: format!("'{message}' needs confirmation; pass --yes in non-interactive use"),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))
}
