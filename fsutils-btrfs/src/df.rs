// SPDX-License-Identifier: GPL-3.0-only

//! Parsing of `btrfs filesystem df` and redundancy accounting

use fsutils_types::{AllocationClass, DfData};

use crate::diagnostics::{Diagnostics, Report};
use crate::error::{BtrfsError, Result};
use crate::size::parse_size;

const MIN_DF_LINES: usize = 3;

/// Redundancy levels with a known copy count
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedundancyLevel {
    Single,
    Dup,
    Raid1,
    Unknown(String),
}

impl RedundancyLevel {
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "single" => RedundancyLevel::Single,
            "dup" => RedundancyLevel::Dup,
            "raid-1" | "raid1" => RedundancyLevel::Raid1,
            _ => RedundancyLevel::Unknown(label.to_string()),
        }
    }

    /// Physical bytes stored per logical byte
    pub fn copies(&self) -> Result<u64> {
        match self {
            RedundancyLevel::Single => Ok(1),
            RedundancyLevel::Dup | RedundancyLevel::Raid1 => Ok(2),
            RedundancyLevel::Unknown(label) => {
                Err(BtrfsError::UnknownRedundancyLevel(label.clone()))
            }
        }
    }
}

/// Used bytes of a record scaled by the copies its level keeps
pub fn accounted_used(record: &DfData) -> Result<u64> {
    let copies = RedundancyLevel::from_label(&record.level).copies()?;
    record.used.checked_mul(copies).ok_or_else(|| {
        BtrfsError::UsageOverflow(format!("{} {} used={}", record.class, record.level, record.used))
    })
}

/// Parse `btrfs filesystem df` output
///
/// Expected format:
/// ```text
/// Data, single: total=9.00GiB, used=8.67GiB
/// System, DUP: total=32.00MiB, used=16.00KiB
/// Metadata, DUP: total=1.00GiB, used=466.88MiB
/// GlobalReserve, single: total=16.00MiB, used=0.00B
/// ```
pub fn parse_filesystem_df<S: AsRef<str>>(
    lines: &[S],
    diagnostics: &dyn Diagnostics,
) -> Result<Vec<DfData>> {
    let lines: Vec<&str> = lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.len() < MIN_DF_LINES {
        return Err(BtrfsError::InsufficientOutput {
            report: Report::FilesystemDf,
            lines: lines.len(),
        });
    }

    lines
        .into_iter()
        .map(|line| {
            diagnostics.raw_line(Report::FilesystemDf, line);
            parse_df_line(line)
        })
        .collect()
}

fn parse_df_line(line: &str) -> Result<DfData> {
    let unexpected = || BtrfsError::unexpected(Report::FilesystemDf, line);

    let fields: Vec<&str> = line.split_whitespace().collect();
    let [class, level, total, used] = fields.as_slice() else {
        return Err(unexpected());
    };

    let class =
        AllocationClass::from_keyword(class.trim_end_matches(',')).ok_or_else(unexpected)?;
    let level = level.trim_end_matches([':', ',']);
    if level.is_empty() {
        return Err(unexpected());
    }

    let total = key_value(total, "total").ok_or_else(unexpected)?;
    let used = key_value(used, "used").ok_or_else(unexpected)?;

    Ok(DfData {
        class,
        level: level.to_string(),
        total: parse_size(total)?,
        used: parse_size(used)?,
    })
}

fn key_value<'a>(field: &'a str, key: &str) -> Option<&'a str> {
    field
        .trim_end_matches(',')
        .split_once('=')
        .filter(|(name, _)| *name == key)
        .map(|(_, value)| value)
}
