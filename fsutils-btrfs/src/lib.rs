// SPDX-License-Identifier: GPL-3.0-only

//! BTRFS reporting library for fsutils
//!
//! This library runs the `btrfs` tool against a mounted filesystem and turns
//! its text reports (`filesystem show`, `filesystem df`, `subvolume list`,
//! `subvolume show`) into a [`Filesystem`] with device, space usage and
//! subvolume data. The parsers are plain functions over already-split lines
//! and can be used without running anything.

pub mod command;
pub mod config;
pub mod df;
pub mod diagnostics;
pub mod error;
pub mod filesystem;
pub mod reader;
pub mod show;
pub mod size;
pub mod subvolume;

// Re-export commonly used types
pub use command::{BtrfsCli, CommandOutput, ReportSource};
pub use config::ReaderConfig;
pub use df::{RedundancyLevel, accounted_used, parse_filesystem_df};
pub use diagnostics::{Diagnostics, Quiet, Report, Traced};
pub use error::{BtrfsError, Result};
pub use filesystem::Filesystem;
pub use reader::{FilesystemReader, get_filesystem};
pub use show::parse_filesystem_show;
pub use size::parse_size;
pub use subvolume::{parse_subvolume_list, parse_subvolume_show};

// Re-export shared models
pub use fsutils_types::btrfs::*;
