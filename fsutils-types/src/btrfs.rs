// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A member device of a BTRFS filesystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Device id as printed by the tool; not assumed to be numeric
    pub devid: String,
    pub size: u64,
    pub used: u64,
    pub path: String,
}

/// Allocation class of a `btrfs filesystem df` line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AllocationClass {
    Data,
    System,
    Metadata,
    GlobalReserve,
}

impl AllocationClass {
    pub const ALL: [AllocationClass; 4] = [
        AllocationClass::Data,
        AllocationClass::System,
        AllocationClass::Metadata,
        AllocationClass::GlobalReserve,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AllocationClass::Data => "Data",
            AllocationClass::System => "System",
            AllocationClass::Metadata => "Metadata",
            AllocationClass::GlobalReserve => "GlobalReserve",
        }
    }

    /// Match the leading keyword of a df line
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == keyword)
    }
}

impl fmt::Display for AllocationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Space usage of one allocation class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfData {
    pub class: AllocationClass,
    /// Redundancy level exactly as reported ("single", "DUP", "RAID1", ...)
    pub level: String,
    pub total: u64,
    pub used: u64,
}

/// Information about a BTRFS subvolume
///
/// Fields missing from the `subvolume show` report keep their default value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subvolume {
    pub name: String,
    pub uuid: String,
    pub parent_uuid: String,
    pub creation_time: Option<DateTime<FixedOffset>>,
    /// Object id, kept as the text the tool printed
    pub id: String,
    pub generation: u32,
    pub gen_at_creation: u32,
    pub parent: u32,
    pub top_level: u32,
    /// Path relative to the filesystem root
    pub path: String,
}
