//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use confgrid_config::ConfigError;
use confgrid_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────
    #[error("Input directory not found: {}", path.display())]
    #[diagnostic(
        code(confgrid::dir_not_found),
        help("Pass the directory holding the running-config dumps, e.g. confgrid build ./configs")
    )]
    DirectoryNotFound { path: PathBuf },

    #[error("No device configurations found in {}", dir.display())]
    #[diagnostic(
        code(confgrid::no_configurations),
        help(
            "Only files whose name contains '{filter}' are read, and only those with a\n\
             hostname statement count as configurations.\n\
             Try: --filter '' to read every file"
        )
    )]
    NoConfigurations { dir: PathBuf, filter: String },

    #[error("Invalid platform '{hint}'")]
    #[diagnostic(
        code(confgrid::invalid_platform),
        help("Use one of: ios, catalyst, nxos, nexus (or omit --platform to auto-detect)")
    )]
    InvalidPlatform { hint: String },

    #[error("Cannot read {}", path.display())]
    #[diagnostic(code(confgrid::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse configuration: {message}")]
    #[diagnostic(code(confgrid::parse))]
    Parse { message: String },

    // ── Output ───────────────────────────────────────────────────────
    #[error("Output file {} is locked by another program", path.display())]
    #[diagnostic(
        code(confgrid::output_conflict),
        help("Close the workbook (Excel keeps it locked while open) and run the command again.")
    )]
    OutputConflict { path: PathBuf },

    #[error("Failed to write workbook {}", path.display())]
    #[diagnostic(code(confgrid::xlsx))]
    Workbook {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    // ── Run control ──────────────────────────────────────────────────
    #[error("Interrupted")]
    #[diagnostic(code(confgrid::interrupted), help("No output was written."))]
    Interrupted,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(confgrid::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(confgrid::config),
        help("Check the configuration file (confgrid config path) and CONFGRID_* variables.")
    )]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DirectoryNotFound { .. } | Self::NoConfigurations { .. } => exit_code::NOT_FOUND,
            Self::InvalidPlatform { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::OutputConflict { .. } => exit_code::CONFLICT,
            Self::Interrupted => exit_code::INTERRUPTED,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidPlatform { hint } => Self::InvalidPlatform { hint },
            CoreError::DirectoryNotFound { path } => Self::DirectoryNotFound { path },
            CoreError::Io { path, source } => Self::ReadFailed { path, source },
            CoreError::Tree(e) => Self::Parse {
                message: e.to_string(),
            },
            CoreError::Cancelled => Self::Interrupted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_the_documented_table() {
        let missing: CliError = CoreError::DirectoryNotFound {
            path: "nope".into(),
        }
        .into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let platform: CliError = CoreError::InvalidPlatform {
            hint: "junos".into(),
        }
        .into();
        assert_eq!(platform.exit_code(), exit_code::USAGE);

        let cancelled: CliError = CoreError::Cancelled.into();
        assert_eq!(cancelled.exit_code(), exit_code::INTERRUPTED);

        let locked = CliError::OutputConflict {
            path: "out.xlsx".into(),
        };
        assert_eq!(locked.exit_code(), exit_code::CONFLICT);
        assert_eq!(CliError::Io(std::io::Error::other("x")).exit_code(), exit_code::GENERAL);
    }
}
