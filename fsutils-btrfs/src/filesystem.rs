// SPDX-License-Identifier: GPL-3.0-only

use fsutils_types::{Device, DfData, Subvolume};
use serde::Serialize;

use crate::df::accounted_used;
use crate::error::{BtrfsError, Result};

/// A BTRFS filesystem as described by one round of `btrfs` reports
///
/// Built from `filesystem show`, then extended with the `filesystem df`
/// records and the subvolumes. Nothing is mutated after assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filesystem {
    label: String,
    uuid: String,
    total_devices: u64,
    fs_bytes_used: u64,
    version: String,
    devices: Vec<Device>,
    df: Vec<DfData>,
    subvolumes: Vec<Subvolume>,
}

impl Filesystem {
    pub fn new(
        label: String,
        uuid: String,
        total_devices: u64,
        fs_bytes_used: u64,
        version: String,
        devices: Vec<Device>,
    ) -> Self {
        Self {
            label,
            uuid,
            total_devices,
            fs_bytes_used,
            version,
            devices,
            df: Vec::new(),
            subvolumes: Vec::new(),
        }
    }

    pub fn with_df(self, df: Vec<DfData>) -> Self {
        Self { df, ..self }
    }

    pub fn with_subvolumes(self, subvolumes: Vec<Subvolume>) -> Self {
        Self { subvolumes, ..self }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Device count from the "Total devices" line
    pub fn total_devices(&self) -> u64 {
        self.total_devices
    }

    /// "FS bytes used" from the summary, not derived from the devices
    pub fn fs_bytes_used(&self) -> u64 {
        self.fs_bytes_used
    }

    /// Tool version from the trailer line, empty when the tool omits it
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn df(&self) -> &[DfData] {
        &self.df
    }

    pub fn subvolumes(&self) -> &[Subvolume] {
        &self.subvolumes
    }

    /// Physical capacity: the sum of every device size
    pub fn total_bytes(&self) -> u64 {
        self.devices.iter().map(|device| device.size).sum()
    }

    /// Bytes reserved by the allocator across all devices
    pub fn allocated_bytes(&self) -> u64 {
        self.devices.iter().map(|device| device.used).sum()
    }

    /// Redundancy-normalized usage summed over the df records
    ///
    /// Fails on the first record whose level has no known multiplier.
    pub fn used_bytes(&self) -> Result<u64> {
        self.df
            .iter()
            .try_fold(0u64, |total, record| {
                total
                    .checked_add(accounted_used(record)?)
                    .ok_or_else(|| BtrfsError::UsageOverflow(format!("sum exceeds {total}")))
            })
    }
}

#[cfg(test)]
mod tests {
    use fsutils_types::AllocationClass;

    use super::*;

    fn device(devid: &str, size: u64, used: u64) -> Device {
        Device {
            devid: devid.to_string(),
            size,
            used,
            path: format!("/dev/sd{devid}"),
        }
    }

    fn record(class: AllocationClass, level: &str, used: u64) -> DfData {
        DfData {
            class,
            level: level.to_string(),
            total: used * 2,
            used,
        }
    }

    fn filesystem(devices: Vec<Device>) -> Filesystem {
        Filesystem::new(
            "none".to_string(),
            "abc-123".to_string(),
            devices.len() as u64,
            0,
            "v3.12".to_string(),
            devices,
        )
    }

    #[test]
    fn sums_device_capacity_and_allocation() {
        let fs = filesystem(vec![device("1", 4096, 1024), device("2", 8192, 512)]);
        assert_eq!(fs.total_bytes(), 12288);
        assert_eq!(fs.allocated_bytes(), 1536);
    }

    #[test]
    fn empty_device_list_sums_to_zero() {
        let fs = filesystem(Vec::new());
        assert_eq!(fs.total_bytes(), 0);
        assert_eq!(fs.allocated_bytes(), 0);
        assert_eq!(fs.used_bytes().unwrap(), 0);
        assert!(fs.df().is_empty());
        assert!(fs.subvolumes().is_empty());
    }

    #[test]
    fn used_bytes_applies_redundancy_multiplier() {
        let fs = filesystem(Vec::new()).with_df(vec![
            record(AllocationClass::Data, "single", 1000),
            record(AllocationClass::System, "DUP", 16),
            record(AllocationClass::Metadata, "raid-1", 100),
        ]);
        assert_eq!(fs.used_bytes().unwrap(), 1000 + 32 + 200);
    }

    #[test]
    fn used_bytes_fails_on_unknown_level() {
        let fs = filesystem(Vec::new()).with_df(vec![
            record(AllocationClass::Data, "single", 1000),
            record(AllocationClass::Metadata, "RAID6", 100),
        ]);
        assert!(matches!(
            fs.used_bytes(),
            Err(BtrfsError::UnknownRedundancyLevel(level)) if level == "RAID6"
        ));
    }

    #[test]
    fn used_bytes_overflow_is_an_error() {
        let near_full = DfData {
            class: AllocationClass::Data,
            level: "single".to_string(),
            total: u64::MAX,
            used: u64::MAX - 1,
        };
        let fs = filesystem(Vec::new())
            .with_df(vec![near_full, record(AllocationClass::Metadata, "single", 2)]);
        assert!(matches!(fs.used_bytes(), Err(BtrfsError::UsageOverflow(_))));
    }

    #[test]
    fn builders_keep_summary_fields() {
        let fs = filesystem(vec![device("1", 10, 5)])
            .with_df(vec![record(AllocationClass::Data, "single", 1)])
            .with_subvolumes(vec![Subvolume::default()]);
        assert_eq!(fs.label(), "none");
        assert_eq!(fs.uuid(), "abc-123");
        assert_eq!(fs.version(), "v3.12");
        assert_eq!(fs.total_devices(), 1);
        assert_eq!(fs.df().len(), 1);
        assert_eq!(fs.subvolumes().len(), 1);
    }
}
