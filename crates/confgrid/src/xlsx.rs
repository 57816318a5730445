//! Workbook sink.
//!
//! Each projection table becomes one worksheet with a bold, frozen header
//! row, an autofilter and fitted column widths. The workbook is saved next
//! to the destination as `<output>.tmp` and renamed into place only after
//! the old file is gone, so an interrupted or failed run never leaves a
//! half-written workbook behind.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use rust_xlsxwriter::{
    Color, ConditionalFormatText, ConditionalFormatTextRule, Format, Workbook, Worksheet, XlsxError,
};

use confgrid_core::projection::{ABSENT, PRESENT};
use confgrid_core::{CancelToken, Table};

use crate::error::CliError;

const MIN_WIDTH: usize = 8;
const MAX_WIDTH: usize = 60;

/// A table to place on its own worksheet.
#[derive(Debug, Clone, Copy)]
pub struct Sheet<'a> {
    pub table: &'a Table,
    /// Color every cell containing `Yes`/`No`, header row included.
    pub highlight: bool,
}

impl<'a> Sheet<'a> {
    pub fn plain(table: &'a Table) -> Self {
        Self {
            table,
            highlight: false,
        }
    }

    pub fn highlighted(table: &'a Table) -> Self {
        Self {
            table,
            highlight: true,
        }
    }
}

/// What to do when the existing output cannot be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Ask the operator whether to retry.
    Prompt,
    /// Retry on a fixed schedule, then give up.
    Retry { attempts: u32, delay: Duration },
    /// Give up immediately.
    Fail,
}

/// Staging file of the save in progress.
pub static STAGED: Staging = Staging::new();

/// Slot holding the staging path while a workbook is being written, so a
/// hard interrupt can remove it before the process exits.
#[derive(Debug, Default)]
pub struct Staging(Mutex<Option<PathBuf>>);

impl Staging {
    pub const fn new() -> Self {
        Self(Mutex::new(None))
    }

    fn set(&self, path: Option<PathBuf>) {
        *self.slot() = path;
    }

    /// Remove the staged file, if any.
    pub fn discard(&self) {
        if let Some(path) = self.slot().take() {
            let _ = std::fs::remove_file(path);
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<PathBuf>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Public entry point ───────────────────────────────────────────────

/// Write `sheets` to `path` atomically.
pub fn save(
    path: &Path,
    sheets: &[Sheet<'_>],
    policy: ConflictPolicy,
    cancel: &CancelToken,
) -> Result<(), CliError> {
    let tmp = temp_path(path);
    STAGED.set(Some(tmp.clone()));
    let result = stage_and_replace(path, &tmp, sheets, policy, cancel);
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    STAGED.set(None);
    result
}

fn stage_and_replace(
    path: &Path,
    tmp: &Path,
    sheets: &[Sheet<'_>],
    policy: ConflictPolicy,
    cancel: &CancelToken,
) -> Result<(), CliError> {
    let mut workbook = build(sheets).map_err(|source| CliError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    workbook.save(tmp).map_err(|source| CliError::Workbook {
        path: tmp.to_path_buf(),
        source,
    })?;
    tracing::debug!(tmp = %tmp.display(), "workbook staged");

    if cancel.is_cancelled() {
        return Err(CliError::Interrupted);
    }
    remove_existing(path, policy, |p: &Path| std::fs::remove_file(p))?;
    std::fs::rename(tmp, path)?;
    Ok(())
}

/// `<path>.tmp`, in the same directory so the final rename stays on one
/// filesystem.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

// ── Conflict handling ────────────────────────────────────────────────

/// Remove `path` if present, applying `policy` when removal fails.
pub fn remove_existing<F>(path: &Path, policy: ConflictPolicy, mut remove: F) -> Result<(), CliError>
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let mut attempt = 0u32;
    loop {
        let err = match remove(path) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => e,
        };
        tracing::warn!(path = %path.display(), error = %err, "cannot remove existing output");
        attempt += 1;

        let retry = match policy {
            ConflictPolicy::Fail => false,
            ConflictPolicy::Retry { attempts, delay } => {
                if attempt < attempts {
                    thread::sleep(delay);
                    true
                } else {
                    false
                }
            }
            ConflictPolicy::Prompt => confirm_retry(path)?,
        };
        if !retry {
            return Err(CliError::OutputConflict {
                path: path.to_path_buf(),
            });
        }
    }
}

fn confirm_retry(path: &Path) -> Result<bool, CliError> {
    dialoguer::Confirm::new()
        .with_prompt(format!(
            "{} is open in another program. Close it and retry?",
            path.display()
        ))
        .default(true)
        .interact()
        .map_err(|e| CliError::Validation {
            field: "interactive".into(),
            reason: format!("prompt failed: {e}"),
        })
}

// ── Workbook construction ────────────────────────────────────────────

fn build(sheets: &[Sheet<'_>]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        write_sheet(worksheet, sheet)?;
    }
    Ok(workbook)
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet<'_>) -> Result<(), XlsxError> {
    let table = sheet.table;
    let header = Format::new().set_bold();
    let wrap = Format::new().set_text_wrap();

    worksheet.set_name(&table.name)?;
    for (col, title) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col_num(col)?, title, &header)?;
    }
    for (idx, row) in table.rows.iter().enumerate() {
        let r = row_num(idx + 1)?;
        for (col, cell) in row.iter().enumerate() {
            if cell.contains('\n') {
                worksheet.write_string_with_format(r, col_num(col)?, cell, &wrap)?;
            } else {
                worksheet.write_string(r, col_num(col)?, cell)?;
            }
        }
    }

    worksheet.set_freeze_panes(1, 1)?;
    for (col, width) in column_widths(table).into_iter().enumerate() {
        worksheet.set_column_width(col_num(col)?, width)?;
    }

    if table.rows.is_empty() || table.headers.is_empty() {
        return Ok(());
    }
    let last_row = row_num(table.rows.len())?;
    let last_col = col_num(table.headers.len() - 1)?;
    worksheet.autofilter(0, 0, last_row, last_col)?;

    if sheet.highlight {
        let positive = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::Green);
        let negative = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::Red);

        let yes = ConditionalFormatText::new()
            .set_rule(ConditionalFormatTextRule::Contains(PRESENT.to_owned()))
            .set_format(&positive);
        let no = ConditionalFormatText::new()
            .set_rule(ConditionalFormatTextRule::Contains(ABSENT.to_owned()))
            .set_format(&negative);

        worksheet.add_conditional_format(0, 0, last_row, last_col, &yes)?;
        worksheet.add_conditional_format(0, 0, last_row, last_col, &no)?;
    }
    Ok(())
}

/// Character width of the longest line per column, clamped.
fn column_widths(table: &Table) -> Vec<f64> {
    (0..table.headers.len())
        .map(|col| {
            let longest = std::iter::once(&table.headers[col])
                .chain(table.rows.iter().filter_map(|row| row.get(col)))
                .flat_map(|cell| cell.lines())
                .map(|line| line.chars().count())
                .max()
                .unwrap_or(0)
                .clamp(MIN_WIDTH, MAX_WIDTH);
            f64::from(u16::try_from(longest).unwrap_or(u16::MAX)) + 2.0
        })
        .collect()
}

fn row_num(idx: usize) -> Result<u32, XlsxError> {
    u32::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}

fn col_num(idx: usize) -> Result<u16, XlsxError> {
    u16::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}
