//! CLI-side settings: the config file's defaults overlaid with flags.
//!
//! Core never sees these types -- it receives a pre-built `RunOptions`.

use std::path::PathBuf;

use clap::ValueEnum;

use confgrid_core::{PlatformHint, RunOptions, VlanOrder};

pub use confgrid_config::{Config, config_path, load_config, save_config};

use crate::cli::{ColorMode, GlobalOpts, InputArgs, OutputFormat, VlanOrderArg};
use crate::error::CliError;
use crate::output;

/// Everything a command needs to find and read the input files.
#[derive(Debug, Clone)]
pub struct InputSettings {
    pub dir: PathBuf,
    pub filter: String,
    pub case_sensitive: bool,
    pub vlan_order: VlanOrder,
    pub run: RunOptions,
}

/// Merge input flags over config defaults. The platform hint is checked
/// here so a typo fails once, up front, instead of once per file.
pub fn resolve_input(args: &InputArgs, cfg: &Config) -> Result<InputSettings, CliError> {
    let d = &cfg.defaults;
    let platform = args.platform.clone().or_else(|| d.platform.clone());
    PlatformHint::parse(platform.as_deref())?;

    Ok(InputSettings {
        dir: args.dir.clone(),
        filter: args.filter.clone().unwrap_or_else(|| d.filter.clone()),
        case_sensitive: args.case_sensitive || d.case_sensitive,
        vlan_order: args.vlan_order.map_or(d.vlan_order, |o| match o {
            VlanOrderArg::FirstSeen => VlanOrder::FirstSeen,
            VlanOrderArg::Numeric => VlanOrder::Numeric,
        }),
        run: RunOptions {
            platform,
            threads: args.threads.unwrap_or(d.threads),
        },
    })
}

/// `--output`, else `defaults.output`.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> Result<OutputFormat, CliError> {
    match global.output {
        Some(format) => Ok(format),
        None => parse_value("defaults.output", &cfg.defaults.output),
    }
}

/// `--color`, else `defaults.color`, resolved against the terminal.
pub fn color_enabled(global: &GlobalOpts, cfg: &Config) -> Result<bool, CliError> {
    let mode = match global.color {
        Some(mode) => mode,
        None => parse_value::<ColorMode>("defaults.color", &cfg.defaults.color)?,
    };
    Ok(output::should_color(mode))
}

fn parse_value<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}
