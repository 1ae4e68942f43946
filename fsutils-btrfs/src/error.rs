// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostics::Report;

/// Error types for BTRFS report acquisition and parsing
#[derive(Error, Debug)]
pub enum BtrfsError {
    #[error("{report} output too short ({lines} lines), check permissions")]
    InsufficientOutput { report: Report, lines: usize },

    #[error("unexpected {report} output: {line}")]
    UnexpectedFormat { report: Report, line: String },

    #[error("malformed {field} in line: {line}")]
    MalformedField { field: &'static str, line: String },

    #[error("malformed size: {0}")]
    MalformedSize(String),

    #[error("unknown redundancy level: {0}")]
    UnknownRedundancyLevel(String),

    #[error("accounted usage overflows 64 bits: {0}")]
    UsageOverflow(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("btrfs binary not found: {0}")]
    ToolNotFound(String),

    #[error("command failed: {command}; stderr: {stderr}")]
    ToolFailed { command: String, stderr: String },

    #[error("invalid config {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("thread pool initialization failed: {0}")]
    ThreadPoolBuild(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BtrfsError {
    pub(crate) fn unexpected(report: Report, line: &str) -> Self {
        BtrfsError::UnexpectedFormat {
            report,
            line: line.to_string(),
        }
    }

    pub(crate) fn malformed(field: &'static str, line: &str) -> Self {
        BtrfsError::MalformedField {
            field,
            line: line.to_string(),
        }
    }
}

/// Result type alias for BTRFS operations
pub type Result<T> = std::result::Result<T, BtrfsError>;
