// SPDX-License-Identifier: GPL-3.0-only

//! Data models for btrfs filesystem reports
//!
//! These types are what the `btrfs` report parsers produce and what clients
//! serialize. They carry no parsing logic of their own:
//!
//! - `Device` → one member device from `btrfs filesystem show`
//! - `DfData` → one allocation-class line from `btrfs filesystem df`
//! - `Subvolume` → one subvolume, merged from `subvolume list` and `subvolume show`

pub mod btrfs;
pub mod common;

pub use btrfs::{AllocationClass, Device, DfData, Subvolume};
pub use common::{bytes_to_pretty, format_size};
