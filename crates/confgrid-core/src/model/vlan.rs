// ── VLAN and SVI domain types ──

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Relay column value for an SVI with no helper addresses.
pub const NO_HELPERS: &str = "No";

/// A `vlan <id>` block found in one device's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanDeclaration {
    pub id: String,
    /// Child `name` statement, empty when absent.
    pub name: String,
}

/// A VLAN id across the whole run and the switches declaring it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanEntry {
    pub id: String,
    /// First non-empty name seen for this id.
    pub name: String,
    /// Declaring hostnames in processing order, deduplicated.
    pub switches: IndexSet<String>,
}

impl VlanEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            switches: IndexSet::new(),
        }
    }

    pub fn is_declared_on(&self, hostname: &str) -> bool {
        self.switches.contains(hostname)
    }
}

/// Routed VLAN interface (`interface Vlan<id>` carrying an address).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SviRecord {
    pub hostname: String,
    pub vlan_id: String,
    /// `address/prefix-length`, empty when the address could not be read.
    pub address: String,
    pub vrf: String,
    /// DHCP relay targets in configuration order.
    pub helpers: Vec<String>,
}

impl SviRecord {
    /// Helper addresses one per line, or `"No"` when there are none.
    pub fn helpers_display(&self) -> String {
        if self.helpers.is_empty() {
            NO_HELPERS.to_owned()
        } else {
            self.helpers.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svi(helpers: &[&str]) -> SviRecord {
        SviRecord {
            hostname: "sw1".into(),
            vlan_id: "10".into(),
            address: "10.0.0.1/24".into(),
            vrf: "default".into(),
            helpers: helpers.iter().map(|h| (*h).to_owned()).collect(),
        }
    }

    #[test]
    fn helpers_use_no_sentinel_when_empty() {
        assert_eq!(svi(&[]).helpers_display(), "No");
    }

    #[test]
    fn helpers_are_newline_joined() {
        assert_eq!(
            svi(&["10.1.1.1", "10.1.1.2"]).helpers_display(),
            "10.1.1.1\n10.1.1.2"
        );
    }

    #[test]
    fn membership_lookup() {
        let mut entry = VlanEntry::new("10");
        entry.switches.insert("sw1".into());
        assert!(entry.is_declared_on("sw1"));
        assert!(!entry.is_declared_on("sw2"));
    }
}
