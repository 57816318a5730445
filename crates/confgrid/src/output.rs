//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders projection tables in the format selected by `--output`. Table
//! uses `tabled`, structured formats serialize header-keyed records via
//! serde, plain emits the first column one value per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::builder::Builder;
use tabled::settings::Style;

use confgrid_core::{Highlight, Table};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Green for `Yes`-like cells, red for `No`-like cells.
fn paint(cell: &str, color: bool) -> String {
    if !color {
        return cell.to_owned();
    }
    match Highlight::for_cell(cell) {
        Some(Highlight::Positive) => cell.green().bold().to_string(),
        Some(Highlight::Negative) => cell.red().bold().to_string(),
        None => cell.to_owned(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a projection table in the chosen format.
pub fn render_table(format: OutputFormat, table: &Table, color: bool) -> String {
    match format {
        OutputFormat::Table => render_grid(table, color),
        OutputFormat::Json => render_json_pretty(&table.records()),
        OutputFormat::JsonCompact => render_json_compact(&table.records()),
        OutputFormat::Yaml => render_yaml(&table.records()),
        OutputFormat::Plain => table
            .rows
            .iter()
            .filter_map(|row| row.first().cloned())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_grid(table: &Table, color: bool) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.headers.iter().map(|cell| paint(cell, color)));
    for row in &table.rows {
        builder.push_record(row.iter().map(|cell| paint(cell, color)));
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Pretty-printed JSON.
pub(crate) fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}

/// Compact single-line JSON.
pub(crate) fn render_json_compact<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).expect("serialization should not fail")
}

/// YAML output.
pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> Table {
        Table {
            name: "vlan_list".into(),
            headers: vec!["vlan_id".into(), "vlan_name".into(), "sw1".into()],
            rows: vec![
                vec!["10".into(), "DATA".into(), "Yes".into()],
                vec!["20".into(), String::new(), "No".into()],
            ],
        }
    }

    #[test]
    fn plain_lists_first_column() {
        assert_eq!(render_table(OutputFormat::Plain, &matrix(), false), "10\n20");
    }

    #[test]
    fn json_uses_header_keys() {
        let out = render_table(OutputFormat::JsonCompact, &matrix(), false);
        assert_eq!(
            out,
            r#"[{"vlan_id":"10","vlan_name":"DATA","sw1":"Yes"},{"vlan_id":"20","vlan_name":"","sw1":"No"}]"#
        );
    }

    #[test]
    fn grid_without_color_has_no_escapes() {
        let out = render_table(OutputFormat::Table, &matrix(), false);
        assert!(out.contains("vlan_name"));
        assert!(out.contains("DATA"));
        assert!(!out.contains('\u{1b}'));
    }

    #[test]
    fn colored_grid_paints_any_matching_cell() {
        let mut t = matrix();
        t.rows[1][1] = "NoVoice".into();
        let out = render_table(OutputFormat::Table, &t, true);
        assert!(out.contains(&paint("NoVoice", true)), "{out}");
        assert!(out.contains(&paint("Yes", true)), "{out}");
    }

    #[test]
    fn colored_cells_carry_escapes() {
        assert!(paint("Yes", true).contains('\u{1b}'));
        assert!(paint("No", true).contains('\u{1b}'));
        assert_eq!(paint("10.0.0.1/24", true), "10.0.0.1/24");
    }
}
