// SPDX-License-Identifier: GPL-3.0-only

use std::path::Path;

use fsutils_types::{DfData, Subvolume};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::command::{BtrfsCli, ReportSource};
use crate::config::ReaderConfig;
use crate::df::parse_filesystem_df;
use crate::diagnostics::{Diagnostics, Quiet, Report, Traced};
use crate::error::{BtrfsError, Result};
use crate::filesystem::Filesystem;
use crate::show::parse_filesystem_show;
use crate::subvolume::{parse_subvolume_list, parse_subvolume_show};

/// Collects the `btrfs` reports for a mounted filesystem
pub struct FilesystemReader<S> {
    source: S,
    config: ReaderConfig,
}

impl FilesystemReader<BtrfsCli> {
    /// Reader backed by the `btrfs` binary named in `config`
    pub fn from_config(config: ReaderConfig) -> Result<Self> {
        let source = BtrfsCli::new(&config.btrfs_binary)?;
        Ok(Self::new(source, config))
    }
}

impl<S: ReportSource> FilesystemReader<S> {
    pub fn new(source: S, config: ReaderConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run every report for `path` and assemble the filesystem
    pub fn read(&self, path: &Path) -> Result<Filesystem> {
        if path.as_os_str().is_empty() {
            return Err(BtrfsError::InvalidPath("path cannot be empty".to_string()));
        }

        let filesystem = self.read_show(path)?.with_df(self.read_df(path)?);
        let filesystem = if self.config.collect_subvolumes {
            filesystem.with_subvolumes(self.read_subvolumes(path)?)
        } else {
            filesystem
        };

        tracing::info!(
            path = %path.display(),
            uuid = filesystem.uuid(),
            devices = filesystem.devices().len(),
            subvolumes = filesystem.subvolumes().len(),
            "read btrfs filesystem"
        );

        Ok(filesystem)
    }

    pub fn read_show(&self, path: &Path) -> Result<Filesystem> {
        let lines = self.acquire(Report::FilesystemShow, path)?;
        parse_filesystem_show(&lines, self.diagnostics())
    }

    pub fn read_df(&self, path: &Path) -> Result<Vec<DfData>> {
        let lines = self.acquire(Report::FilesystemDf, path)?;
        parse_filesystem_df(&lines, self.diagnostics())
    }

    /// Relative paths of every subvolume below `path`
    pub fn read_subvolume_paths(&self, path: &Path) -> Result<Vec<String>> {
        let lines = self.acquire(Report::SubvolumeList, path)?;
        parse_subvolume_list(&lines, self.diagnostics())
    }

    /// Details of the subvolume at `relative` under the filesystem `root`
    ///
    /// `subvolume list` prints paths relative to the top-level subvolume
    /// (id 5), so `root` must be where that subvolume is mounted. A mount of
    /// another subvolume (`subvol=@`) resolves the paths to the wrong place.
    pub fn read_subvolume(&self, root: &Path, relative: &str) -> Result<Subvolume> {
        let lines = self.acquire(Report::SubvolumeShow, &root.join(relative))?;
        parse_subvolume_show(relative, &lines, self.diagnostics())
    }

    /// List the subvolumes, then fetch the details of each, keeping list order
    ///
    /// `root` must be the top-level subvolume mount, see
    /// [`read_subvolume`](Self::read_subvolume).
    pub fn read_subvolumes(&self, root: &Path) -> Result<Vec<Subvolume>> {
        let paths = self.read_subvolume_paths(root)?;

        if paths.len() < 2 || self.config.detail_threads == Some(1) {
            return paths
                .iter()
                .map(|relative| self.read_subvolume(root, relative))
                .collect();
        }

        let threads = self
            .config
            .detail_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(4, usize::from));

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.min(paths.len()).max(1))
            .build()
            .map_err(|error| BtrfsError::ThreadPoolBuild(error.to_string()))?;

        pool.install(|| {
            paths
                .par_iter()
                .map(|relative| self.read_subvolume(root, relative))
                .collect()
        })
    }

    fn diagnostics(&self) -> &'static dyn Diagnostics {
        if self.config.trace_raw_lines {
            &Traced
        } else {
            &Quiet
        }
    }

    fn acquire(&self, report: Report, target: &Path) -> Result<Vec<String>> {
        let mut args: Vec<String> = report.args().iter().map(ToString::to_string).collect();
        let target = target.to_str().ok_or_else(|| {
            BtrfsError::InvalidPath(format!("not valid UTF-8: {}", target.display()))
        })?;
        args.push(target.to_string());

        let output = self.source.run(&args)?;

        if !output.stderr_lines.is_empty() {
            return Err(BtrfsError::ToolFailed {
                stderr: output.stderr(),
                command: output.command,
            });
        }

        if !output.success {
            tracing::warn!(command = %output.command, "btrfs exited with failure but no stderr");
        }

        Ok(output.stdout_lines)
    }
}

/// Read a filesystem with the installed `btrfs` binary and default settings
pub fn get_filesystem(path: &Path) -> Result<Filesystem> {
    FilesystemReader::from_config(ReaderConfig::default())?.read(path)
}
