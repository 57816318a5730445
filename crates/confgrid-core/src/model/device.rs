// ── Device domain types ──

use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::platform::Dialect;

/// Layer-2 mode of a switch port.
///
/// Ports without a `switchport mode` statement negotiate, hence the
/// `Dynamic` default. Modes outside the three common ones (private-vlan,
/// dot1q-tunnel, ...) are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum SwitchportMode {
    Access,
    Trunk,
    #[default]
    Dynamic,
    Other(String),
}

impl SwitchportMode {
    /// Classify the argument of a `switchport mode` statement.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.split_whitespace().next() {
            Some("access") => Self::Access,
            Some("trunk") => Self::Trunk,
            Some("dynamic") | None => Self::Dynamic,
            Some(_) => Self::Other(raw.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Access => "access",
            Self::Trunk => "trunk",
            Self::Dynamic => "dynamic",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for SwitchportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SwitchportMode> for String {
    fn from(mode: SwitchportMode) -> Self {
        mode.as_str().to_owned()
    }
}

impl From<String> for SwitchportMode {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

/// One physical port or port-channel member of a switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub name: String,
    pub mode: SwitchportMode,
    pub description: String,
    /// 802.1X port-control configured.
    pub authentication: bool,
    /// Port-channel group number, empty when not a member.
    pub etherchannel_id: String,
    pub access_vlan: String,
    /// Own voice VLAN, else the device-wide network-policy voice VLAN.
    pub voice_vlan: String,
    /// Comma-joined allowed list, `add` statements appended in file order.
    pub trunk_vlans: String,
    pub trunk_native: String,
    pub speed: String,
    pub duplex: String,
}

impl InterfaceRecord {
    /// A record holding every documented default for interface `name`.
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: SwitchportMode::Dynamic,
            description: String::new(),
            authentication: false,
            etherchannel_id: String::new(),
            access_vlan: String::new(),
            voice_vlan: String::new(),
            trunk_vlans: String::new(),
            trunk_native: String::new(),
            speed: "auto".into(),
            duplex: "auto".into(),
        }
    }
}

/// A switch and the ports extracted from its configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Lower-cased hostname, unique within a run.
    pub hostname: String,
    pub dialect: Dialect,
    /// File the configuration was read from.
    pub source: PathBuf,
    /// Interfaces keyed by name, in configuration order.
    pub interfaces: IndexMap<String, InterfaceRecord>,
    /// VLAN from the `network-policy profile` voice statement, if any.
    pub global_voice_vlan: Option<String>,
    pub dhcp_snooping_vlans: Vec<String>,
    pub arp_inspection_vlans: Vec<String>,
}
