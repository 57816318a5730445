//! Clap derive structures for the `confgrid` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Kept free of workspace crates so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// confgrid -- switch, VLAN and interface inventory from Cisco running-configs
#[derive(Debug, Parser)]
#[command(
    name = "confgrid",
    version,
    about = "Build an interface and VLAN workbook from Cisco running-configs",
    long_about = "Reads a directory of Cisco IOS / NX-OS `show running-config` dumps and\n\
        extracts switches, VLAN declarations, switch ports and SVIs.\n\n\
        `build` writes an .xlsx workbook; `vlans`, `ifaces`, `svis` and `devices`\n\
        print the same tables to the terminal.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Output format for terminal views [default: table]
    #[arg(long, short = 'o', env = "CONFGRID_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, first column only (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VlanOrderArg {
    /// Order in which VLAN ids were first declared
    FirstSeen,
    /// Numeric VLAN id ascending
    Numeric,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract every configuration and write the .xlsx workbook
    #[command(alias = "b")]
    Build(BuildArgs),

    /// Print the VLAN membership matrix
    #[command(alias = "v")]
    Vlans(InputArgs),

    /// Print one row per switch port
    #[command(alias = "i", alias = "interfaces")]
    Ifaces(InputArgs),

    /// Print routed VLAN interfaces with VRF and DHCP relays
    Svis(InputArgs),

    /// Print one summary row per switch
    #[command(alias = "d")]
    Devices(InputArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Inputs ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Directory holding the configuration dumps (searched recursively)
    pub dir: PathBuf,

    /// Only read files whose name contains this text [default: config]
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Match --filter case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,

    /// Force a platform instead of auto-detecting: ios, catalyst, nxos, nexus
    #[arg(long, short = 'p')]
    pub platform: Option<String>,

    /// Row order of the VLAN matrix [default: first-seen]
    #[arg(long, value_enum)]
    pub vlan_order: Option<VlanOrderArg>,

    /// Extraction threads (0 = one per core)
    #[arg(long, short = 'j')]
    pub threads: Option<usize>,
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Workbook path [default: <DIR>/output.xlsx]
    #[arg(long = "out", short = 'O')]
    pub out: Option<PathBuf>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Write a configuration file holding the defaults
    Init,
    /// Print the configuration file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
