//! Command dispatch: bridges CLI args -> core batch run -> sinks.

pub mod build;
pub mod config_cmd;
pub mod show;
pub mod util;

use confgrid_core::CancelToken;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Dispatch an input-reading command to the appropriate handler.
pub fn dispatch(
    cmd: Command,
    cfg: &Config,
    global: &GlobalOpts,
    cancel: &CancelToken,
) -> Result<(), CliError> {
    match cmd {
        Command::Build(args) => build::handle(args, cfg, global, cancel),
        Command::Vlans(args) => show::handle(show::View::Vlans, &args, cfg, global, cancel),
        Command::Ifaces(args) => show::handle(show::View::Ifaces, &args, cfg, global, cancel),
        Command::Svis(args) => show::handle(show::View::Svis, &args, cfg, global, cancel),
        Command::Devices(args) => show::handle(show::View::Devices, &args, cfg, global, cancel),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
