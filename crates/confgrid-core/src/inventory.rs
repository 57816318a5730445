// ── Inventory aggregator ──
//
// Owns the run-wide tables: devices by hostname, VLANs by id and SVIs by
// (hostname, vlan id). `merge` is the only writer; callers fold extracts in
// file-processing order, which decides every tie-break below.

use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

use crate::extract::DeviceExtract;
use crate::model::{Device, SviRecord, VlanEntry};

/// A key collision resolved by last-write-wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InventoryWarning {
    /// Two files carry the same hostname; the later file replaced the
    /// earlier device's interfaces.
    DuplicateHostname {
        hostname: String,
        replaced: PathBuf,
        by: PathBuf,
    },
    /// The same (hostname, vlan) SVI appeared twice; the later one is kept.
    DuplicateSvi { hostname: String, vlan_id: String },
}

impl fmt::Display for InventoryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateHostname {
                hostname,
                replaced,
                by,
            } => write!(
                f,
                "hostname '{hostname}' in {} replaces the device read from {}",
                by.display(),
                replaced.display()
            ),
            Self::DuplicateSvi { hostname, vlan_id } => {
                write!(f, "SVI Vlan{vlan_id} on '{hostname}' defined more than once")
            }
        }
    }
}

/// Devices, VLANs and SVIs gathered over one run.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    devices: IndexMap<String, Device>,
    vlans: IndexMap<String, VlanEntry>,
    svis: IndexMap<(String, String), SviRecord>,
    warnings: Vec<InventoryWarning>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's extract into the tables.
    pub fn merge(&mut self, extract: DeviceExtract) {
        let DeviceExtract {
            device,
            vlans,
            svis,
        } = extract;
        let hostname = device.hostname.clone();

        for decl in vlans {
            let entry = self
                .vlans
                .entry(decl.id.clone())
                .or_insert_with(|| VlanEntry::new(decl.id.clone()));
            if entry.name.is_empty() {
                entry.name = decl.name;
            } else if !decl.name.is_empty() && decl.name != entry.name {
                tracing::debug!(
                    vlan = %entry.id,
                    kept = %entry.name,
                    ignored = %decl.name,
                    %hostname,
                    "conflicting vlan name"
                );
            }
            entry.switches.insert(hostname.clone());
        }

        for svi in svis {
            let (host, vlan_id) = (svi.hostname.clone(), svi.vlan_id.clone());
            if self
                .svis
                .insert((host.clone(), vlan_id.clone()), svi)
                .is_some()
            {
                self.warn(InventoryWarning::DuplicateSvi {
                    hostname: host,
                    vlan_id,
                });
            }
        }

        let source = device.source.clone();
        if let Some(previous) = self.devices.insert(hostname.clone(), device) {
            self.warn(InventoryWarning::DuplicateHostname {
                hostname,
                replaced: previous.source,
                by: source,
            });
        }
    }

    fn warn(&mut self, warning: InventoryWarning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    // ── Views ────────────────────────────────────────────────────────

    /// Devices in first-seen order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn device(&self, hostname: &str) -> Option<&Device> {
        self.devices.get(hostname)
    }

    /// VLANs in the order their ids were first declared.
    pub fn vlans(&self) -> impl Iterator<Item = &VlanEntry> {
        self.vlans.values()
    }

    pub fn vlan(&self, id: &str) -> Option<&VlanEntry> {
        self.vlans.get(id)
    }

    pub fn svis(&self) -> impl Iterator<Item = &SviRecord> {
        self.svis.values()
    }

    pub fn svi(&self, hostname: &str, vlan_id: &str) -> Option<&SviRecord> {
        self.svis.get(&(hostname.to_owned(), vlan_id.to_owned()))
    }

    pub fn warnings(&self) -> &[InventoryWarning] {
        &self.warnings
    }

    /// Hostnames sorted ascending: the column order of the VLAN matrix.
    pub fn sorted_hostnames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.devices.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{InterfaceRecord, VlanDeclaration};
    use crate::platform::Dialect;

    fn extract(hostname: &str, source: &str, vlans: &[(&str, &str)], svis: &[&str]) -> DeviceExtract {
        let mut interfaces = IndexMap::new();
        interfaces.insert("Gi1/0/1".to_owned(), InterfaceRecord::with_defaults("Gi1/0/1"));
        DeviceExtract {
            device: Device {
                hostname: hostname.into(),
                dialect: Dialect::Ios,
                source: source.into(),
                interfaces,
                global_voice_vlan: None,
                dhcp_snooping_vlans: Vec::new(),
                arp_inspection_vlans: Vec::new(),
            },
            vlans: vlans
                .iter()
                .map(|(id, name)| VlanDeclaration {
                    id: (*id).into(),
                    name: (*name).into(),
                })
                .collect(),
            svis: svis
                .iter()
                .map(|id| SviRecord {
                    hostname: hostname.into(),
                    vlan_id: (*id).into(),
                    address: format!("10.0.{id}.1/24"),
                    vrf: "default".into(),
                    helpers: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn membership_follows_processing_order() {
        let mut inv = Inventory::new();
        inv.merge(extract("sw2", "b", &[("10", "DATA")], &[]));
        inv.merge(extract("sw1", "a", &[("20", ""), ("10", "")], &[]));

        let vlans: Vec<(&str, Vec<&str>)> = inv
            .vlans()
            .map(|v| (v.id.as_str(), v.switches.iter().map(String::as_str).collect()))
            .collect();
        assert_eq!(vlans, [("10", vec!["sw2", "sw1"]), ("20", vec!["sw1"])]);
        assert_eq!(inv.sorted_hostnames(), ["sw1", "sw2"]);
    }

    #[test]
    fn first_non_empty_vlan_name_wins() {
        let mut inv = Inventory::new();
        inv.merge(extract("a", "a", &[("10", "")], &[]));
        inv.merge(extract("b", "b", &[("10", "USERS")], &[]));
        inv.merge(extract("c", "c", &[("10", "OTHER")], &[]));
        assert_eq!(inv.vlan("10").unwrap().name, "USERS");
    }

    #[test]
    fn duplicate_hostname_overwrites_with_warning() {
        let mut inv = Inventory::new();
        inv.merge(extract("sw1", "first.txt", &[], &[]));
        inv.merge(extract("sw1", "second.txt", &[], &[]));

        assert_eq!(inv.device_count(), 1);
        assert_eq!(inv.device("sw1").unwrap().source, PathBuf::from("second.txt"));
        assert_eq!(
            inv.warnings(),
            [InventoryWarning::DuplicateHostname {
                hostname: "sw1".into(),
                replaced: "first.txt".into(),
                by: "second.txt".into(),
            }]
        );
    }

    #[test]
    fn duplicate_svi_keeps_latest() {
        let mut inv = Inventory::new();
        inv.merge(extract("sw1", "a", &[("10", "")], &["10"]));
        let mut again = extract("sw9", "b", &[], &[]);
        again.svis.push(SviRecord {
            hostname: "sw1".into(),
            vlan_id: "10".into(),
            address: "192.0.2.1/24".into(),
            vrf: "default".into(),
            helpers: Vec::new(),
        });
        inv.merge(again);

        assert_eq!(inv.svi("sw1", "10").unwrap().address, "192.0.2.1/24");
        assert!(matches!(
            inv.warnings(),
            [InventoryWarning::DuplicateSvi { hostname, vlan_id }] if hostname == "sw1" && vlan_id == "10"
        ));
    }

    #[test]
    fn warning_messages_name_both_sources() {
        let warning = InventoryWarning::DuplicateHostname {
            hostname: "sw1".into(),
            replaced: "a.txt".into(),
            by: "b.txt".into(),
        };
        assert_eq!(
            warning.to_string(),
            "hostname 'sw1' in b.txt replaces the device read from a.txt"
        );
        assert_eq!(
            serde_json::to_value(&warning).unwrap(),
            serde_json::json!({
                "kind": "duplicate_hostname",
                "hostname": "sw1",
                "replaced": "a.txt",
                "by": "b.txt"
            })
        );
    }
}
