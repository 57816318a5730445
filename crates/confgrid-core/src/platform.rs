// ── Platform disambiguation ──
//
// IOS (Catalyst) and NX-OS (Nexus) share most statement syntax but differ in
// interface naming and in how strictly the text is structured. The choice is
// either given by the operator or probed: NX-OS first, falling back to IOS
// when the NX-OS grammar rejects the text or when long-form IOS interface
// names (`GigabitEthernet`, `TenGigabitEthernet`, ...) show up.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CoreError;
use crate::tree::StatementTree;

static IOS_LONG_ETHERNET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^interface \S+Ethernet").expect("invalid IOS interface pattern")
});

/// One of the two supported configuration grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Catalyst IOS / IOS-XE.
    #[strum(serialize = "catalyst", to_string = "ios")]
    Ios,
    /// Nexus NX-OS.
    #[strum(serialize = "nexus", to_string = "nxos")]
    Nxos,
}

/// How the dialect of each file is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformHint {
    /// Probe every file (NX-OS first, IOS fallback).
    #[default]
    Auto,
    /// Parse every file with this dialect, no probing.
    Explicit(Dialect),
}

impl PlatformHint {
    /// Interpret an optional operator-supplied hint.
    ///
    /// `None` and blank strings mean auto-detection; anything that is not a
    /// known platform name is an [`CoreError::InvalidPlatform`].
    pub fn parse(hint: Option<&str>) -> Result<Self, CoreError> {
        match hint.map(str::trim) {
            None | Some("") => Ok(Self::Auto),
            Some(raw) => Dialect::from_str(raw)
                .map(Self::Explicit)
                .map_err(|_| CoreError::InvalidPlatform { hint: raw.to_owned() }),
        }
    }
}

impl FromStr for PlatformHint {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        Self::parse(Some(s))
    }
}

/// Parse `text` into a tree under the dialect chosen by `hint`.
pub fn parse_with_hint(text: &str, hint: PlatformHint) -> Result<StatementTree, CoreError> {
    match hint {
        PlatformHint::Explicit(dialect) => Ok(StatementTree::parse(text, dialect)?),
        PlatformHint::Auto => detect(text),
    }
}

/// Auto-detect the dialect and return the tree parsed under it.
pub fn detect(text: &str) -> Result<StatementTree, CoreError> {
    match StatementTree::parse(text, Dialect::Nxos) {
        Ok(tree) if tree.find_roots(&IOS_LONG_ETHERNET).next().is_none() => Ok(tree),
        Ok(_) => {
            tracing::debug!("long-form ethernet names found, re-parsing as ios");
            Ok(StatementTree::parse(text, Dialect::Ios)?)
        }
        Err(err) => {
            tracing::debug!(error = %err, "nxos grammar rejected text, re-parsing as ios");
            Ok(StatementTree::parse(text, Dialect::Ios)?)
        }
    }
}
