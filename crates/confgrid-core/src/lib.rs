//! Extraction engine between raw Cisco running-configs and tabular output.
//!
//! This crate owns the parsing, domain model and aggregation logic of the
//! `confgrid` workspace:
//!
//! - **[`StatementTree`]**: indentation-driven statement hierarchy with regex
//!   queries over nodes, in two dialects ([`Dialect::Ios`], [`Dialect::Nxos`]).
//!
//! - **Platform disambiguation** ([`platform`]): explicit hint or NX-OS-first
//!   probing with a deterministic IOS fallback.
//!
//! - **[`extract_device`]**: pure per-file extraction of the device, its VLAN
//!   declarations, Ethernet and channel-member interfaces, and SVIs. Missing
//!   statements yield documented defaults, never errors.
//!
//! - **[`Inventory`]**: run-wide device, VLAN and SVI tables with
//!   last-write-wins collisions surfaced as [`InventoryWarning`]s.
//!
//! - **[`batch`]**: parallel extraction with in-order merging, per-file skip
//!   reasons and cooperative cancellation.
//!
//! - **[`projection`]**: interface table, VLAN membership matrix, SVI and
//!   device tables as plain [`Table`] values for any sink.

pub mod batch;
pub mod discover;
pub mod error;
pub mod extract;
pub mod inventory;
pub mod model;
pub mod platform;
pub mod projection;
pub mod tree;

// ── Primary re-exports ──────────────────────────────────────────────
pub use batch::{BatchReport, CancelToken, RunOptions, SkipReason, SkippedFile};
pub use error::CoreError;
pub use extract::{DeviceExtract, extract_device};
pub use inventory::{Inventory, InventoryWarning};
pub use platform::{Dialect, PlatformHint};
pub use projection::{Highlight, Table, VlanOrder};
pub use tree::{Statement, StatementTree, TreeError};

pub use model::{Device, InterfaceRecord, SviRecord, SwitchportMode, VlanDeclaration, VlanEntry};
