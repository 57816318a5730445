//! `build`: extract every configuration and write the workbook.

use std::path::Path;

use confgrid_core::{BatchReport, CancelToken, projection};

use crate::cli::{BuildArgs, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::xlsx::{self, Sheet};

use super::util;

pub fn handle(
    args: BuildArgs,
    cfg: &Config,
    global: &GlobalOpts,
    cancel: &CancelToken,
) -> Result<(), CliError> {
    let settings = config::resolve_input(&args.input, cfg)?;
    let out = args
        .out
        .unwrap_or_else(|| settings.dir.join(&cfg.defaults.output_name));

    let report = util::run_batch(&settings, global, cancel)?;
    let inventory = &report.inventory;

    let ifaces = projection::interface_table(inventory);
    let vlans = projection::vlan_matrix(inventory, settings.vlan_order);
    let svis = projection::svi_table(inventory);
    let devices = projection::device_table(inventory);
    let sheets = [
        Sheet::plain(&ifaces),
        Sheet::highlighted(&vlans),
        Sheet::plain(&svis),
        Sheet::plain(&devices),
    ];

    xlsx::save(&out, &sheets, util::conflict_policy(global), cancel)?;
    tracing::info!(path = %out.display(), "workbook written");

    if !global.quiet {
        eprintln!("{}", summary(&report, &out));
    }
    Ok(())
}

fn summary(report: &BatchReport, out: &Path) -> String {
    let inv = &report.inventory;
    let mut text = format!(
        "Wrote {}: {} switches, {} VLANs, {} SVIs",
        out.display(),
        inv.device_count(),
        inv.vlans().count(),
        inv.svis().count(),
    );
    let noteworthy = report
        .skipped
        .iter()
        .filter(|s| s.reason.is_noteworthy())
        .count();
    if noteworthy > 0 {
        text.push_str(&format!(" ({noteworthy} files skipped)"));
    }
    if !inv.warnings().is_empty() {
        text.push_str(&format!(" ({} warnings)", inv.warnings().len()));
    }
    text
}
