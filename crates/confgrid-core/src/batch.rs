// ── Batch driver ──
//
// Reads and extracts every candidate file on the rayon pool, then folds the
// results into an `Inventory` in input order. Extraction is pure, so the
// parallel run produces the same tables as a sequential one.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::Serialize;

use crate::error::CoreError;
use crate::extract::{DeviceExtract, extract_device};
use crate::inventory::Inventory;
use crate::platform::{self, PlatformHint};

/// Knobs for one run. Built by the caller; the core reads no config files.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Raw platform hint; `None` means auto-detect per file.
    pub platform: Option<String>,
    /// Worker threads, `0` for the rayon default.
    pub threads: usize,
}

/// Shared flag flipped by an interrupt handler.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why a candidate file contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// No `hostname` statement: not a device configuration.
    NotAConfiguration,
    InvalidPlatform { hint: String },
    /// The selected grammar rejected the text.
    Malformed { message: String },
    Unreadable { message: String },
}

impl SkipReason {
    /// Skips worth surfacing to the operator. Non-configuration files are
    /// expected noise from the name filter.
    pub fn is_noteworthy(&self) -> bool {
        !matches!(self, Self::NotAConfiguration)
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAConfiguration => f.write_str("no hostname statement"),
            Self::InvalidPlatform { hint } => write!(f, "invalid platform '{hint}'"),
            Self::Malformed { message } | Self::Unreadable { message } => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Outcome of a run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub processed: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
    pub inventory: Inventory,
}

/// Read, parse and extract one file.
pub fn process_file(path: &Path, platform: Option<&str>) -> Result<DeviceExtract, SkipReason> {
    let hint = PlatformHint::parse(platform).map_err(|_| SkipReason::InvalidPlatform {
        hint: platform.unwrap_or_default().to_owned(),
    })?;

    let bytes = std::fs::read(path).map_err(|e| SkipReason::Unreadable {
        message: CoreError::io(path, e).to_string(),
    })?;
    let text = String::from_utf8_lossy(&bytes);

    let tree = platform::parse_with_hint(&text, hint).map_err(|e| SkipReason::Malformed {
        message: e.to_string(),
    })?;

    extract_device(&tree, path).ok_or(SkipReason::NotAConfiguration)
}

/// Run the whole batch.
pub fn run(
    files: &[PathBuf],
    options: &RunOptions,
    cancel: &CancelToken,
) -> Result<BatchReport, CoreError> {
    run_with_progress(files, options, cancel, |_| {})
}

/// Run the whole batch, calling `on_file` once per file as it finishes.
pub fn run_with_progress<F>(
    files: &[PathBuf],
    options: &RunOptions,
    cancel: &CancelToken,
    on_file: F,
) -> Result<BatchReport, CoreError>
where
    F: Fn(&Path) + Sync,
{
    let extract_all = || -> Vec<Option<Result<DeviceExtract, SkipReason>>> {
        files
            .par_iter()
            .map(|path| {
                if cancel.is_cancelled() {
                    return None;
                }
                let outcome = process_file(path, options.platform.as_deref());
                on_file(path);
                Some(outcome)
            })
            .collect()
    };

    let outcomes = match build_pool(options.threads) {
        Some(pool) => pool.install(extract_all),
        None => extract_all(),
    };

    let mut report = BatchReport::default();
    for (path, outcome) in files.iter().zip(outcomes) {
        match outcome {
            None => return Err(CoreError::Cancelled),
            Some(Ok(extract)) => {
                report.inventory.merge(extract);
                report.processed.push(path.clone());
            }
            Some(Err(reason)) => {
                if reason.is_noteworthy() {
                    tracing::warn!(path = %path.display(), %reason, "skipping file");
                } else {
                    tracing::debug!(path = %path.display(), %reason, "skipping file");
                }
                report.skipped.push(SkippedFile {
                    path: path.clone(),
                    reason,
                });
            }
        }
    }
    if cancel.is_cancelled() {
        return Err(CoreError::Cancelled);
    }

    tracing::info!(
        devices = report.inventory.device_count(),
        processed = report.processed.len(),
        skipped = report.skipped.len(),
        "batch complete"
    );
    Ok(report)
}

fn build_pool(threads: usize) -> Option<rayon::ThreadPool> {
    if threads == 0 {
        return None;
    }
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => Some(pool),
        Err(err) => {
            tracing::warn!(error = %err, threads, "cannot build worker pool, using the global one");
            None
        }
    }
}
