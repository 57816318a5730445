// ── Tabular projection ──
//
// Flattens an `Inventory` into header-plus-rows tables. Sinks (workbook,
// terminal, JSON) render `Table` values and know nothing of the model.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::inventory::Inventory;
use crate::model::VlanEntry;

/// Matrix cell for a VLAN the switch does not declare.
pub const ABSENT: &str = "No";
/// Matrix cell for a declared VLAN without a routed interface.
pub const PRESENT: &str = "Yes";

pub const INTERFACE_HEADERS: [&str; 12] = [
    "hostname",
    "iface_name",
    "mode",
    "description",
    "authentication",
    "etherchannel_id",
    "access_vlan",
    "voice_vlan",
    "trunk_vlan",
    "trunk_native",
    "iface_speed",
    "iface_duplex",
];

pub const SVI_HEADERS: [&str; 5] = ["hostname", "vlan_id", "vrf", "ip_address", "dhcp_relay"];

pub const DEVICE_HEADERS: [&str; 7] = [
    "hostname",
    "platform",
    "source_file",
    "interfaces",
    "global_voice_vlan",
    "dhcp_snooping_vlans",
    "arp_inspection_vlans",
];

/// A named grid of strings with a header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn new(name: &str, headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.to_owned(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell at `row` under `header`.
    pub fn cell(&self, row: usize, header: &str) -> Option<&str> {
        let col = self.column(header)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Rows as header-keyed maps, for JSON and YAML output.
    pub fn records(&self) -> Vec<IndexMap<&str, &str>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .map(String::as_str)
                    .zip(row.iter().map(String::as_str))
                    .collect()
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Row order of the VLAN matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum VlanOrder {
    /// Order in which ids were first declared across the run.
    #[default]
    FirstSeen,
    /// Numeric ids ascending, anything non-numeric after them.
    Numeric,
}

/// Conditional styling of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Positive,
    Negative,
}

impl Highlight {
    /// Substring match: any cell containing `Yes` is positive, else any cell
    /// containing `No` is negative.
    pub fn for_cell(text: &str) -> Option<Self> {
        if text.contains(PRESENT) {
            Some(Self::Positive)
        } else if text.contains(ABSENT) {
            Some(Self::Negative)
        } else {
            None
        }
    }
}

// ── Projections ──────────────────────────────────────────────────────

/// One row per (device, interface) in extraction order.
pub fn interface_table(inventory: &Inventory) -> Table {
    let mut table = Table::new("ifaces", INTERFACE_HEADERS);
    for device in inventory.devices() {
        for iface in device.interfaces.values() {
            table.rows.push(vec![
                device.hostname.clone(),
                iface.name.clone(),
                iface.mode.to_string(),
                iface.description.clone(),
                if iface.authentication { "yes" } else { "" }.to_owned(),
                iface.etherchannel_id.clone(),
                iface.access_vlan.clone(),
                iface.voice_vlan.clone(),
                iface.trunk_vlans.clone(),
                iface.trunk_native.clone(),
                iface.speed.clone(),
                iface.duplex.clone(),
            ]);
        }
    }
    table
}

/// One row per VLAN, one column per hostname (sorted).
pub fn vlan_matrix(inventory: &Inventory, order: VlanOrder) -> Table {
    let hostnames = inventory.sorted_hostnames();
    let mut table = Table::new(
        "vlan_list",
        ["vlan_id", "vlan_name"].into_iter().chain(hostnames.iter().copied()),
    );

    for entry in ordered_vlans(inventory, order) {
        let mut row = vec![entry.id.clone(), entry.name.clone()];
        row.extend(
            hostnames
                .iter()
                .map(|host| matrix_cell(inventory, entry, host)),
        );
        table.rows.push(row);
    }
    table
}

fn matrix_cell(inventory: &Inventory, entry: &VlanEntry, hostname: &str) -> String {
    if !entry.is_declared_on(hostname) {
        return ABSENT.to_owned();
    }
    match inventory.svi(hostname, &entry.id) {
        Some(svi) if !svi.address.is_empty() => svi.address.clone(),
        _ => PRESENT.to_owned(),
    }
}

fn ordered_vlans(inventory: &Inventory, order: VlanOrder) -> Vec<&VlanEntry> {
    let mut vlans: Vec<&VlanEntry> = inventory.vlans().collect();
    if order == VlanOrder::Numeric {
        vlans.sort_by_key(|v| v.id.parse::<u64>().unwrap_or(u64::MAX));
    }
    vlans
}

/// Every SVI, grouped by hostname, first-seen within a host.
pub fn svi_table(inventory: &Inventory) -> Table {
    let mut table = Table::new("svi_list", SVI_HEADERS);
    let mut svis: Vec<_> = inventory.svis().collect();
    svis.sort_by(|a, b| a.hostname.cmp(&b.hostname));
    for svi in svis {
        table.rows.push(vec![
            svi.hostname.clone(),
            svi.vlan_id.clone(),
            svi.vrf.clone(),
            svi.address.clone(),
            svi.helpers_display(),
        ]);
    }
    table
}

/// One summary row per device, sorted by hostname.
pub fn device_table(inventory: &Inventory) -> Table {
    let mut table = Table::new("devices", DEVICE_HEADERS);
    for hostname in inventory.sorted_hostnames() {
        let Some(device) = inventory.device(hostname) else {
            continue;
        };
        table.rows.push(vec![
            device.hostname.clone(),
            device.dialect.to_string(),
            device.source.display().to_string(),
            device.interfaces.len().to_string(),
            device.global_voice_vlan.clone().unwrap_or_default(),
            device.dhcp_snooping_vlans.join(","),
            device.arp_inspection_vlans.join(","),
        ]);
    }
    table
}
