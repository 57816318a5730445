// ── Core error types ──
//
// Errors surfaced by confgrid-core. Field-level extraction never fails:
// absent or malformed statements fall back to their documented defaults,
// so nothing below describes a single configuration line.

use std::path::PathBuf;

use thiserror::Error;

use crate::tree::TreeError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid platform '{hint}' (expected one of: ios, catalyst, nxos, nexus)")]
    InvalidPlatform { hint: String },

    #[error("Cannot parse configuration: {0}")]
    Tree(#[from] TreeError),

    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    // ── Run control ──────────────────────────────────────────────────
    #[error("Run cancelled by operator")]
    Cancelled,
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
