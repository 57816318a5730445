mod cli;
mod commands;
mod config;
mod error;
mod output;
mod xlsx;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use confgrid_core::CancelToken;

use crate::cli::{Cli, Command};
use crate::error::{CliError, exit_code};

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose, cli.global.quiet);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, quiet: bool) {
    let filter = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// First Ctrl-C asks the run to wind down; a second one removes any
/// half-written workbook and exits at once.
fn install_interrupt_handler() -> CancelToken {
    let token = CancelToken::new();
    let handler_token = token.clone();
    let installed = ctrlc::set_handler(move || {
        if handler_token.is_cancelled() {
            xlsx::STAGED.discard();
            std::process::exit(exit_code::INTERRUPTED);
        }
        eprintln!("Interrupted, finishing current files (Ctrl-C again to abort)");
        handler_token.cancel();
    });
    if let Err(e) = installed {
        tracing::warn!(error = %e, "cannot install Ctrl-C handler");
    }
    token
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't read any input
        Command::Config(ref args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(ref args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "confgrid", &mut std::io::stdout());
            Ok(())
        }

        // All other commands read a directory of configurations
        cmd => {
            let cfg = config::load_config()?;
            let cancel = install_interrupt_handler();

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &cfg, &cli.global, &cancel)
        }
    }
}
