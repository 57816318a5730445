#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use confgrid_core::projection::{interface_table, vlan_matrix};
use confgrid_core::{CancelToken, RunOptions, SkipReason, VlanOrder, batch, discover};
use pretty_assertions::assert_eq;

const SW1: &str = "\
hostname SW1
!
vlan 10
 name DATA
!
interface GigabitEthernet1/0/1
 switchport access vlan 10
 switchport mode access
!
end
";

const SW2: &str = "\
hostname SW2
!
interface GigabitEthernet1/0/1
 switchport mode trunk
!
end
";

fn seed(dir: &Path) {
    fs::write(dir.join("sw1-config.txt"), SW1).unwrap();
    fs::write(dir.join("sw2-config.txt"), SW2).unwrap();
    fs::write(dir.join("notes-config.txt"), "todo: collect configs\n").unwrap();
    fs::write(dir.join("inventory.csv"), "hostname SW3\n").unwrap();
}

fn run(dir: &Path) -> confgrid_core::BatchReport {
    let files = discover::find_files(dir, "config", false).unwrap();
    batch::run(&files, &RunOptions::default(), &CancelToken::new()).unwrap()
}

#[test]
fn two_switch_vlan_matrix() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());

    let report = run(dir.path());
    let matrix = vlan_matrix(&report.inventory, VlanOrder::FirstSeen);

    assert_eq!(matrix.headers, ["vlan_id", "vlan_name", "sw1", "sw2"]);
    assert_eq!(matrix.rows, [["10", "DATA", "Yes", "No"]]);
}

#[test]
fn non_configuration_file_is_skipped_silently() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());

    let report = run(dir.path());
    assert_eq!(report.processed.len(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::NotAConfiguration);
    assert!(!report.skipped[0].reason.is_noteworthy());
    assert_eq!(report.inventory.sorted_hostnames(), ["sw1", "sw2"]);
}

#[test]
fn repeated_runs_produce_identical_tables() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());

    let first = run(dir.path());
    let second = run(dir.path());

    assert_eq!(
        interface_table(&first.inventory),
        interface_table(&second.inventory)
    );
    assert_eq!(
        vlan_matrix(&first.inventory, VlanOrder::Numeric),
        vlan_matrix(&second.inventory, VlanOrder::Numeric)
    );
}

#[test]
fn interface_defaults_survive_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());

    let table = interface_table(&run(dir.path()).inventory);
    let sw2_row = table
        .rows
        .iter()
        .position(|r| r[0] == "sw2")
        .unwrap();
    assert_eq!(table.cell(sw2_row, "mode"), Some("trunk"));
    assert_eq!(table.cell(sw2_row, "description"), Some(""));
    assert_eq!(table.cell(sw2_row, "iface_speed"), Some("auto"));
}
