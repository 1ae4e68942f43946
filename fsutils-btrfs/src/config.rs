// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BtrfsError, Result};

/// Settings for [`FilesystemReader`](crate::FilesystemReader)
///
/// Loaded from TOML; every key is optional:
/// ```toml
/// btrfs_binary = "/usr/sbin/btrfs"
/// collect_subvolumes = true
/// detail_threads = 4
/// trace_raw_lines = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Name or path of the `btrfs` executable
    pub btrfs_binary: PathBuf,
    /// Run `subvolume list` and one `subvolume show` per entry
    pub collect_subvolumes: bool,
    /// Threads used for `subvolume show`; None uses all available cores
    pub detail_threads: Option<usize>,
    /// Emit every raw report line as a trace event
    pub trace_raw_lines: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            btrfs_binary: PathBuf::from("btrfs"),
            collect_subvolumes: true,
            detail_threads: None,
            trace_raw_lines: false,
        }
    }
}

impl ReaderConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let invalid = |reason: String| BtrfsError::Config {
            path: path.to_path_buf(),
            reason,
        };

        let raw = fs::read_to_string(path).map_err(|error| invalid(error.to_string()))?;
        let config: ReaderConfig = toml::from_str(&raw).map_err(|error| invalid(error.to_string()))?;

        config.validate().map_err(invalid)?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.btrfs_binary.as_os_str().is_empty() {
            return Err("btrfs_binary must not be empty".to_string());
        }

        if self.detail_threads == Some(0) {
            return Err("detail_threads must be at least 1".to_string());
        }

        Ok(())
    }
}
