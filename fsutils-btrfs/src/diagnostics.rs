// SPDX-License-Identifier: GPL-3.0-only

//! Sink for the raw report lines seen by the parsers

use std::fmt;

/// The `btrfs` report a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Report {
    FilesystemShow,
    FilesystemDf,
    SubvolumeList,
    SubvolumeShow,
}

impl Report {
    /// Arguments after the binary name, without the target path
    pub fn args(self) -> [&'static str; 2] {
        match self {
            Report::FilesystemShow => ["filesystem", "show"],
            Report::FilesystemDf => ["filesystem", "df"],
            Report::SubvolumeList => ["subvolume", "list"],
            Report::SubvolumeShow => ["subvolume", "show"],
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [group, action] = self.args();
        write!(f, "{group} {action}")
    }
}

/// Receives every raw line a parser consumes.
pub trait Diagnostics {
    fn raw_line(&self, report: Report, line: &str);
}

/// Discards all lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quiet;

impl Diagnostics for Quiet {
    fn raw_line(&self, _report: Report, _line: &str) {}
}

/// Emits each line as a `trace` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Traced;

impl Diagnostics for Traced {
    fn raw_line(&self, report: Report, line: &str) {
        tracing::trace!(%report, line, "btrfs output");
    }
}
