//! Shared configuration for the confgrid CLI.
//!
//! A single TOML file under the platform config directory supplies
//! defaults for every run. Environment variables (`CONFGRID_*`) override
//! the file and command-line flags override both; the CLI applies that
//! last layer.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use confgrid_core::{PlatformHint, VlanOrder};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Run defaults, each overridable per invocation.
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    /// Substring a file name must contain to be read.
    #[serde(default = "default_filter")]
    pub filter: String,

    #[serde(default)]
    pub case_sensitive: bool,

    /// `ios`, `catalyst`, `nxos` or `nexus`; unset means auto-detect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// Workbook file name, created inside the input directory.
    #[serde(default = "default_output_name")]
    pub output_name: String,

    #[serde(default)]
    pub vlan_order: VlanOrder,

    /// Extraction threads; 0 lets rayon decide.
    #[serde(default)]
    pub threads: usize,

    /// Terminal output format for `vlans` / `ifaces`.
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            case_sensitive: false,
            platform: None,
            output_name: default_output_name(),
            vlan_order: VlanOrder::default(),
            threads: 0,
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_filter() -> String {
    "config".into()
}
fn default_output_name() -> String {
    "output.xlsx".into()
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

impl Config {
    /// Reject values that would only fail later, mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.defaults;
        PlatformHint::parse(d.platform.as_deref()).map_err(|e| ConfigError::Validation {
            field: "defaults.platform".into(),
            reason: e.to_string(),
        })?;

        let name = Path::new(&d.output_name);
        if d.output_name.trim().is_empty() || name.components().count() != 1 {
            return Err(ConfigError::Validation {
                field: "defaults.output_name".into(),
                reason: format!("expected a plain file name, got '{}'", d.output_name),
            });
        }
        Ok(())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "confgrid", "confgrid").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("confgrid");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path, still honoring `CONFGRID_*` variables.
///
/// Nested keys use a double underscore: `CONFGRID_DEFAULTS__VLAN_ORDER`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CONFGRID_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
