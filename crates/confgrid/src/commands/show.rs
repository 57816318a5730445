//! Terminal views over the same tables the workbook holds.

use confgrid_core::{CancelToken, Table, projection};

use crate::cli::{GlobalOpts, InputArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

/// Which projection to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Vlans,
    Ifaces,
    Svis,
    Devices,
}

impl View {
    /// Only the membership matrix carries Yes/No cells worth coloring.
    fn highlights(self) -> bool {
        self == Self::Vlans
    }
}

pub fn handle(
    view: View,
    args: &InputArgs,
    cfg: &Config,
    global: &GlobalOpts,
    cancel: &CancelToken,
) -> Result<(), CliError> {
    let settings = config::resolve_input(args, cfg)?;
    let format = config::output_format(global, cfg)?;
    let color = config::color_enabled(global, cfg)? && view.highlights();

    let report = util::run_batch(&settings, global, cancel)?;
    let inventory = &report.inventory;
    let table: Table = match view {
        View::Vlans => projection::vlan_matrix(inventory, settings.vlan_order),
        View::Ifaces => projection::interface_table(inventory),
        View::Svis => projection::svi_table(inventory),
        View::Devices => projection::device_table(inventory),
    };
    tracing::debug!(view = ?view, rows = table.rows.len(), "rendering");

    let out = output::render_table(format, &table, color);
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_matrix_is_colored() {
        assert!(View::Vlans.highlights());
        for view in [View::Ifaces, View::Svis, View::Devices] {
            assert!(!view.highlights(), "{view:?}");
        }
    }
}
