// ── Device record extraction ──
//
// Walks one parsed configuration and derives the device, its VLAN
// declarations, its qualifying interfaces and its SVIs. Every field is a
// small total function over a statement with an explicit default: absent or
// malformed configuration yields the default, never an error. Extraction is
// pure; merging into the run-wide tables is the aggregator's job.

use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::{Device, InterfaceRecord, SviRecord, SwitchportMode, VlanDeclaration};
use crate::tree::{Statement, StatementTree};

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect(concat!("invalid pattern ", stringify!($name))));
    };
}

// ── Global statements ──
pattern!(HOSTNAME, r"^hostname\s+(\S+)");
pattern!(VLAN_DECLARATION, r"^vlan\s+(\d+)$");
pattern!(VLAN_NAME, r"^name\s+(.+)$");
pattern!(NETWORK_POLICY, r"^network-policy profile\b");
pattern!(POLICY_VOICE_VLAN, r"^voice vlan\s");
pattern!(DHCP_SNOOPING_VLANS, r"^ip dhcp snooping vlan\s+(.+)$");
pattern!(ARP_INSPECTION_VLANS, r"^ip arp inspection vlan\s+(.+)$");

// ── Interfaces ──
pattern!(INTERFACE, r"^interface\s+(.+)$");
pattern!(
    ETHERNET_NAME,
    r"(?i)^(?:[a-z-]*ethernet|[a-z]*gige|gi|fa|te|tw|fo|hu|eth?)\s*\d"
);
pattern!(CHANNEL_GROUP, r"^channel-group\s+(\d+)");
pattern!(CHANNEL_MEMBER, r"^channel-group\b");
pattern!(SWITCHPORT_MODE, r"^switchport mode\s+(.+)$");
pattern!(DESCRIPTION, r"^description\s+(.+)$");
pattern!(PORT_CONTROL, r"^(?:authentication|dot1x) port-control auto\b");
pattern!(ACCESS_VLAN, r"^switchport access vlan\s+(\S+)");
pattern!(VOICE_VLAN, r"^switchport voice vlan\s+(\S+)");
pattern!(TRUNK_ALLOWED, r"^switchport trunk allowed vlan\s+(.+)$");
pattern!(TRUNK_NATIVE, r"^switchport trunk native vlan\s+(\S+)");
pattern!(SPEED, r"^speed\s+(.+)$");
pattern!(DUPLEX, r"^duplex\s+(\S+)");

// ── SVIs ──
pattern!(SVI, r"(?i)^interface\s+vlan\s*(\d+)$");
pattern!(IP_ADDRESS, r"^ip address\s+(.+)$");
pattern!(VRF, r"^(?:ip vrf forwarding|vrf forwarding|vrf member)\s+(\S+)");
pattern!(
    HELPER,
    r"^(?:ip helper-address(?:\s+vrf\s+\S+|\s+global)?|ip dhcp relay address)\s+(\S+)"
);

/// VRF reported for SVIs without an explicit VRF statement.
pub const DEFAULT_VRF: &str = "default";

/// Everything one configuration file contributes to the inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceExtract {
    pub device: Device,
    pub vlans: Vec<VlanDeclaration>,
    pub svis: Vec<SviRecord>,
}

/// Extract a device from a parsed configuration.
///
/// Returns `None` when the text has no `hostname` statement: such files are
/// not device configurations and contribute nothing.
pub fn extract_device(tree: &StatementTree, source: &Path) -> Option<DeviceExtract> {
    let hostname = hostname(tree)?;
    tracing::debug!(%hostname, dialect = %tree.dialect(), source = %source.display(), "extracting device");

    let global_voice_vlan = global_voice_vlan(tree);
    let interfaces = interfaces(tree, global_voice_vlan.as_deref());
    let svis = svis(tree, &hostname);

    let device = Device {
        hostname,
        dialect: tree.dialect(),
        source: source.to_path_buf(),
        interfaces,
        global_voice_vlan,
        dhcp_snooping_vlans: vlan_list(tree, &DHCP_SNOOPING_VLANS),
        arp_inspection_vlans: vlan_list(tree, &ARP_INSPECTION_VLANS),
    };

    Some(DeviceExtract {
        device,
        vlans: vlan_declarations(tree),
        svis,
    })
}

// ── Device-wide fields ───────────────────────────────────────────────

/// Lower-cased argument of the first top-level `hostname` statement.
pub fn hostname(tree: &StatementTree) -> Option<String> {
    tree.roots()
        .find_map(|s| capture(s.text(), &HOSTNAME))
        .map(str::to_lowercase)
}

/// Top-level `vlan <id>` blocks, exactly (ranges and references excluded).
pub fn vlan_declarations(tree: &StatementTree) -> Vec<VlanDeclaration> {
    tree.roots()
        .filter_map(|s| {
            let id = capture(s.text(), &VLAN_DECLARATION)?;
            Some(VlanDeclaration {
                id: id.to_owned(),
                name: child_capture(s, &VLAN_NAME).unwrap_or_default().to_owned(),
            })
        })
        .collect()
}

/// VLAN id of the first `voice vlan` statement under a network-policy profile.
pub fn global_voice_vlan(tree: &StatementTree) -> Option<String> {
    tree.find_children_of(&NETWORK_POLICY, &POLICY_VOICE_VLAN)
        .next()
        .and_then(|s| s.text().split_whitespace().nth(2))
        .map(str::to_owned)
}

/// Comma list from a global `... vlan <list>` statement, whitespace removed.
fn vlan_list(tree: &StatementTree, pattern: &Regex) -> Vec<String> {
    tree.roots()
        .find_map(|s| capture(s.text(), pattern))
        .map(|list| {
            list.split(',')
                .map(|item| item.split_whitespace().collect::<String>())
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

// ── Interfaces ───────────────────────────────────────────────────────

/// Whether an interface name denotes an Ethernet-class port.
pub fn is_ethernet_name(name: &str) -> bool {
    ETHERNET_NAME.is_match(name)
}

/// Ethernet ports and channel members, keyed by interface name.
pub fn interfaces(
    tree: &StatementTree,
    global_voice_vlan: Option<&str>,
) -> IndexMap<String, InterfaceRecord> {
    tree.find_roots(&INTERFACE)
        .filter_map(|iface| {
            let name = capture(iface.text(), &INTERFACE)?;
            (is_ethernet_name(name) || iface.has_child(&CHANNEL_MEMBER))
                .then(|| (name.to_owned(), interface_record(iface, name, global_voice_vlan)))
        })
        .collect()
}

/// Build the record for one interface block.
pub fn interface_record(
    iface: Statement<'_>,
    name: &str,
    global_voice_vlan: Option<&str>,
) -> InterfaceRecord {
    InterfaceRecord {
        name: name.to_owned(),
        mode: switchport_mode(iface),
        description: owned_or_default(child_capture(iface, &DESCRIPTION)),
        authentication: iface.has_child(&PORT_CONTROL),
        etherchannel_id: owned_or_default(child_capture(iface, &CHANNEL_GROUP)),
        access_vlan: owned_or_default(child_capture(iface, &ACCESS_VLAN)),
        voice_vlan: owned_or_default(child_capture(iface, &VOICE_VLAN).or(global_voice_vlan)),
        trunk_vlans: trunk_vlans(iface),
        trunk_native: owned_or_default(child_capture(iface, &TRUNK_NATIVE)),
        speed: child_capture(iface, &SPEED).unwrap_or("auto").to_owned(),
        duplex: child_capture(iface, &DUPLEX).unwrap_or("auto").to_owned(),
    }
}

fn switchport_mode(iface: Statement<'_>) -> SwitchportMode {
    child_capture(iface, &SWITCHPORT_MODE).map_or_else(SwitchportMode::default, SwitchportMode::parse)
}

/// The primary allowed list followed by every `add` list, comma-joined.
pub fn trunk_vlans(iface: Statement<'_>) -> String {
    let mut primary: Option<&str> = None;
    let mut added: Vec<&str> = Vec::new();

    for list in iface
        .children()
        .filter_map(|c| capture(c.text(), &TRUNK_ALLOWED))
    {
        if let Some(extra) = list.strip_prefix("add ") {
            added.push(extra.trim());
        } else if primary.is_none() {
            primary = Some(list);
        }
    }

    primary.into_iter().chain(added).collect::<Vec<_>>().join(",")
}

// ── SVIs ─────────────────────────────────────────────────────────────

/// `interface Vlan<id>` blocks carrying an `ip address` statement.
pub fn svis(tree: &StatementTree, hostname: &str) -> Vec<SviRecord> {
    tree.find_with_child(&SVI, &IP_ADDRESS)
        .filter_map(|iface| {
            let vlan_id = capture(iface.text(), &SVI)?;
            Some(SviRecord {
                hostname: hostname.to_owned(),
                vlan_id: vlan_id.to_owned(),
                address: svi_address(iface).unwrap_or_default(),
                vrf: child_capture(iface, &VRF).unwrap_or(DEFAULT_VRF).to_owned(),
                helpers: iface
                    .children()
                    .filter_map(|c| capture(c.text(), &HELPER))
                    .map(str::to_owned)
                    .collect(),
            })
        })
        .collect()
}

/// Primary address of an SVI in CIDR form. Secondary addresses are ignored.
fn svi_address(iface: Statement<'_>) -> Option<String> {
    iface
        .children()
        .filter_map(|c| capture(c.text(), &IP_ADDRESS))
        .find(|args| !args.split_whitespace().any(|t| t == "secondary"))
        .and_then(cidr)
}

/// Normalize `A.B.C.D M.M.M.M` or `A.B.C.D/N` to `A.B.C.D/N`.
pub fn cidr(args: &str) -> Option<String> {
    let mut tokens = args.split_whitespace();
    let first = tokens.next()?;

    let (addr, prefix) = match first.split_once('/') {
        Some((addr, len)) => (addr.parse::<Ipv4Addr>().ok()?, len.parse::<u32>().ok()?),
        None => {
            let mask: Ipv4Addr = tokens.next()?.parse().ok()?;
            (first.parse::<Ipv4Addr>().ok()?, mask_prefix_len(mask)?)
        }
    };

    (prefix <= 32).then(|| format!("{addr}/{prefix}"))
}

/// Prefix length of a contiguous netmask.
fn mask_prefix_len(mask: Ipv4Addr) -> Option<u32> {
    let bits = u32::from(mask);
    let len = bits.leading_ones();
    (bits.checked_shl(len).unwrap_or(0) == 0).then_some(len)
}

// ── Helpers ──────────────────────────────────────────────────────────

/// First capture group of `pattern` in `text`, trimmed.
fn capture<'t>(text: &'t str, pattern: &Regex) -> Option<&'t str> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// First capture from the first child of `stmt` matching `pattern`.
fn child_capture<'a>(stmt: Statement<'a>, pattern: &Regex) -> Option<&'a str> {
    stmt.children().find_map(|c| capture(c.text(), pattern))
}

fn owned_or_default(value: Option<&str>) -> String {
    value.map(str::to_owned).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::platform::Dialect;

    const CATALYST: &str = "\
Building configuration...
!
version 16.12
hostname ACCESS-SW1
!
ip dhcp snooping vlan 10, 20-30
ip arp inspection vlan 10
!
vlan 10
 name DATA
!
vlan 20
!
vlan 30
vlan 40-45
!
network-policy profile 1
 voice vlan 50 cos 5
!
interface GigabitEthernet1/0/1
 description user port
 switchport access vlan 10
 switchport mode access
 authentication port-control auto
!
interface GigabitEthernet1/0/2
 switchport access vlan 20
 switchport voice vlan 60
!
interface GigabitEthernet1/0/48
 switchport trunk native vlan 99
 switchport trunk allowed vlan 10,20
 switchport trunk allowed vlan add 30
 switchport trunk allowed vlan add 40
 switchport mode trunk
 speed 1000
 duplex full
 channel-group 1 mode active
!
interface Port-channel1
 switchport mode trunk
!
interface Loopback0
 ip address 192.0.2.1 255.255.255.255
!
interface Vlan10
 ip vrf forwarding USERS
 ip address 10.0.10.1 255.255.255.0
 ip address 10.0.11.1 255.255.255.0 secondary
 ip helper-address 10.9.9.9
 ip helper-address vrf USERS 10.9.9.10
!
interface Vlan20
 no ip address
 shutdown
!
interface Vlan30
 ip address 10.0.30.1 255.255.255.0
!
end
";

    const NEXUS: &str = "\
!Command: show running-config
!Time: Mon Jan  4 10:00:00 2021

version 9.3(5)
hostname n9k-core

vlan 1,10,20
vlan 10
  name SERVERS

interface Vlan10
  no shutdown
  vrf member PROD
  ip address 10.10.10.2/24
  ip dhcp relay address 10.9.9.9

interface port-channel10
  switchport mode trunk

interface Ethernet1/1
  switchport mode trunk
  channel-group 10 mode active

interface mgmt0
  vrf member management
  ip address 192.168.0.10/24
";

    fn catalyst() -> DeviceExtract {
        let tree = StatementTree::parse(CATALYST, Dialect::Ios).unwrap();
        extract_device(&tree, Path::new("access-sw1-config.txt")).unwrap()
    }

    fn nexus() -> DeviceExtract {
        let tree = StatementTree::parse(NEXUS, Dialect::Nxos).unwrap();
        extract_device(&tree, Path::new("n9k-config.txt")).unwrap()
    }

    #[test]
    fn hostname_is_lower_cased() {
        let extract = catalyst();
        assert_eq!(extract.device.hostname, "access-sw1");
        assert_eq!(extract.device.dialect, Dialect::Ios);
    }

    #[test]
    fn missing_hostname_rejects_file() {
        let tree = StatementTree::parse("just some notes\nabout vlans\n", Dialect::Ios).unwrap();
        assert!(extract_device(&tree, Path::new("notes-config.txt")).is_none());
    }

    #[test]
    fn only_exact_vlan_blocks_are_declarations() {
        let ids: Vec<(String, String)> = catalyst()
            .vlans
            .into_iter()
            .map(|v| (v.id, v.name))
            .collect();
        assert_eq!(
            ids,
            [
                ("10".to_owned(), "DATA".to_owned()),
                ("20".to_owned(), String::new()),
                ("30".to_owned(), String::new()),
            ]
        );
    }

    #[test]
    fn access_port_fields() {
        let extract = catalyst();
        let port = &extract.device.interfaces["GigabitEthernet1/0/1"];
        assert_eq!(port.mode, SwitchportMode::Access);
        assert_eq!(port.description, "user port");
        assert!(port.authentication);
        assert_eq!(port.access_vlan, "10");
        assert_eq!(port.etherchannel_id, "");
        assert_eq!(port.speed, "auto");
        assert_eq!(port.duplex, "auto");
    }

    #[test]
    fn unconfigured_fields_take_defaults() {
        let extract = catalyst();
        let port = &extract.device.interfaces["GigabitEthernet1/0/2"];
        assert_eq!(port.mode, SwitchportMode::Dynamic);
        assert_eq!(port.description, "");
        assert!(!port.authentication);
        assert_eq!(port.trunk_vlans, "");
        assert_eq!(port.trunk_native, "");
    }

    #[test]
    fn voice_vlan_own_value_wins_over_policy() {
        let extract = catalyst();
        assert_eq!(extract.device.global_voice_vlan.as_deref(), Some("50"));
        assert_eq!(
            extract.device.interfaces["GigabitEthernet1/0/1"].voice_vlan,
            "50"
        );
        assert_eq!(
            extract.device.interfaces["GigabitEthernet1/0/2"].voice_vlan,
            "60"
        );
    }

    #[test]
    fn trunk_allowed_lists_accumulate_in_order() {
        let extract = catalyst();
        let uplink = &extract.device.interfaces["GigabitEthernet1/0/48"];
        assert_eq!(uplink.trunk_vlans, "10,20,30,40");
        assert_eq!(uplink.trunk_native, "99");
        assert_eq!(uplink.mode, SwitchportMode::Trunk);
        assert_eq!(uplink.etherchannel_id, "1");
        assert_eq!(uplink.speed, "1000");
        assert_eq!(uplink.duplex, "full");
    }

    #[test]
    fn non_ethernet_interfaces_are_excluded() {
        let names: Vec<String> = catalyst().device.interfaces.into_keys().collect();
        assert_eq!(
            names,
            [
                "GigabitEthernet1/0/1",
                "GigabitEthernet1/0/2",
                "GigabitEthernet1/0/48"
            ]
        );
    }

    #[test]
    fn svis_need_an_address_statement() {
        let extract = catalyst();
        let ids: Vec<&str> = extract.svis.iter().map(|s| s.vlan_id.as_str()).collect();
        assert_eq!(ids, ["10", "30"]);
    }

    #[test]
    fn svi_fields() {
        let extract = catalyst();
        let users = &extract.svis[0];
        assert_eq!(users.hostname, "access-sw1");
        assert_eq!(users.address, "10.0.10.1/24");
        assert_eq!(users.vrf, "USERS");
        assert_eq!(users.helpers, ["10.9.9.9", "10.9.9.10"]);

        let plain = &extract.svis[1];
        assert_eq!(plain.vrf, DEFAULT_VRF);
        assert_eq!(plain.helpers_display(), "No");
    }

    #[test]
    fn global_vlan_lists_drop_whitespace() {
        let device = catalyst().device;
        assert_eq!(device.dhcp_snooping_vlans, ["10", "20-30"]);
        assert_eq!(device.arp_inspection_vlans, ["10"]);
    }

    #[test]
    fn nexus_configuration() {
        let extract = nexus();
        assert_eq!(extract.device.hostname, "n9k-core");
        assert_eq!(extract.vlans.len(), 1);
        assert_eq!(extract.vlans[0].name, "SERVERS");

        let names: Vec<&String> = extract.device.interfaces.keys().collect();
        assert_eq!(names, ["Ethernet1/1"]);
        assert_eq!(extract.device.interfaces["Ethernet1/1"].etherchannel_id, "10");

        assert_eq!(extract.svis.len(), 1);
        let svi = &extract.svis[0];
        assert_eq!(svi.address, "10.10.10.2/24");
        assert_eq!(svi.vrf, "PROD");
        assert_eq!(svi.helpers, ["10.9.9.9"]);
    }

    #[test]
    fn channel_member_without_ethernet_name_is_kept() {
        let text = "hostname sw\ninterface Port-channel5\n channel-group 7 mode on\n";
        let tree = StatementTree::parse(text, Dialect::Ios).unwrap();
        let extract = extract_device(&tree, Path::new("sw-config")).unwrap();
        assert_eq!(extract.device.interfaces["Port-channel5"].etherchannel_id, "7");
    }

    #[test]
    fn add_without_primary_keeps_only_additions() {
        let text = "hostname sw\ninterface Gi0/1\n switchport trunk allowed vlan add 5\n";
        let tree = StatementTree::parse(text, Dialect::Ios).unwrap();
        let extract = extract_device(&tree, Path::new("sw-config")).unwrap();
        assert_eq!(extract.device.interfaces["Gi0/1"].trunk_vlans, "5");
    }

    #[test]
    fn ethernet_name_classification() {
        for name in [
            "GigabitEthernet1/0/1",
            "TenGigabitEthernet1/1/1",
            "FastEthernet0/1",
            "Ethernet1/1",
            "TwentyFiveGigE1/0/1",
            "Gi1/0/1",
            "Eth1/1",
        ] {
            assert!(is_ethernet_name(name), "{name} should be ethernet");
        }
        for name in ["Vlan10", "Port-channel1", "Loopback0", "mgmt0", "Tunnel1"] {
            assert!(!is_ethernet_name(name), "{name} should not be ethernet");
        }
    }

    #[test]
    fn cidr_normalization() {
        assert_eq!(cidr("10.0.0.1 255.255.255.0").as_deref(), Some("10.0.0.1/24"));
        assert_eq!(cidr("10.0.0.1/24").as_deref(), Some("10.0.0.1/24"));
        assert_eq!(cidr("10.0.0.1 255.255.255.255").as_deref(), Some("10.0.0.1/32"));
        assert_eq!(cidr("10.0.0.1 0.0.0.0").as_deref(), Some("10.0.0.1/0"));
        assert_eq!(cidr("10.0.0.1 255.0.255.0"), None);
        assert_eq!(cidr("10.0.0.1/33"), None);
        assert_eq!(cidr("dhcp"), None);
    }

    #[test]
    fn malformed_address_keeps_svi_with_empty_address() {
        let text = "hostname sw\ninterface Vlan5\n ip address dhcp\n";
        let tree = StatementTree::parse(text, Dialect::Ios).unwrap();
        let extract = extract_device(&tree, Path::new("sw-config")).unwrap();
        assert_eq!(extract.svis.len(), 1);
        assert_eq!(extract.svis[0].address, "");
    }
}
