// SPDX-License-Identifier: GPL-3.0-only

//! Running the `btrfs` tool and splitting its output into lines

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{BtrfsError, Result};

/// Output of one tool invocation, already split into lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub command: String,
    pub stdout_lines: Vec<String>,
    pub stderr_lines: Vec<String>,
    pub success: bool,
}

impl CommandOutput {
    pub fn stderr(&self) -> String {
        self.stderr_lines.join("\n")
    }
}

/// Something that can run a `btrfs` subcommand
///
/// Implementations must be shareable across threads: `subvolume show`
/// invocations are issued in parallel.
pub trait ReportSource: Send + Sync {
    fn run(&self, args: &[String]) -> Result<CommandOutput>;
}

pub fn render(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}

/// [`ReportSource`] backed by the installed `btrfs` binary
#[derive(Debug, Clone)]
pub struct BtrfsCli {
    binary: PathBuf,
}

impl BtrfsCli {
    /// Resolve `binary` through `PATH` (or check it when it is a path)
    pub fn new(binary: &Path) -> Result<Self> {
        let binary = which::which(binary)
            .map_err(|error| BtrfsError::ToolNotFound(format!("{}: {}", binary.display(), error)))?;
        tracing::debug!(binary = %binary.display(), "resolved btrfs binary");
        Ok(Self { binary })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl ReportSource for BtrfsCli {
    fn run(&self, args: &[String]) -> Result<CommandOutput> {
        let rendered = render(&self.binary.to_string_lossy(), args);
        tracing::debug!(command = %rendered, "running");

        // output() drains stdout and stderr together before reaping the child
        let output = Command::new(&self.binary).args(args).output()?;

        Ok(CommandOutput {
            command: rendered,
            stdout_lines: split_lines(&output.stdout),
            stderr_lines: split_lines(&output.stderr),
            success: output.status.success(),
        })
    }
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(ToString::to_string)
        .collect()
}
