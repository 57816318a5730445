// ── Domain model ──
//
// Canonical inventory types shared by the extractor, the aggregator and the
// projections. VLAN ids stay strings end to end so that odd values found in
// real configurations pass through untouched.

pub mod device;
pub mod vlan;

pub use device::{Device, InterfaceRecord, SwitchportMode};
pub use vlan::{SviRecord, VlanDeclaration, VlanEntry};
