// SPDX-License-Identifier: GPL-3.0-only

//! Parsing of `btrfs filesystem show <path>`

use fsutils_types::Device;

use crate::diagnostics::{Diagnostics, Report};
use crate::error::{BtrfsError, Result};
use crate::filesystem::Filesystem;
use crate::size::parse_size;

/// Parse `btrfs filesystem show` output for a single filesystem
///
/// Expected format:
/// ```text
/// Label: none  uuid: b7c23711-6b9e-46a8-b451-4b3f79c7bc46
///     Total devices 2 FS bytes used 14.67GiB
///     devid    1 size 40.00GiB used 16.01GiB path /dev/sdc1
///     devid    2 size 40.00GiB used 16.01GiB path /dev/sdd1
///
/// Btrfs v3.12
/// ```
///
/// Newer tools drop the `Btrfs` trailer, in which case the version is empty.
pub fn parse_filesystem_show<S: AsRef<str>>(
    lines: &[S],
    diagnostics: &dyn Diagnostics,
) -> Result<Filesystem> {
    let mut lines: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    if lines.len() < 2 {
        return Err(BtrfsError::InsufficientOutput {
            report: Report::FilesystemShow,
            lines: lines.len(),
        });
    }

    for line in &lines {
        diagnostics.raw_line(Report::FilesystemShow, line);
    }

    let (label, uuid) = parse_label_line(lines[0])?;
    let (total_devices, fs_bytes_used) = parse_total_line(lines[1])?;

    let mut version = String::new();
    let mut devices = Vec::new();
    let last = lines.len() - 1;

    for (index, line) in lines.iter().enumerate().skip(2) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.first() {
            None => continue,
            Some(&"devid") => devices.push(parse_device_line(line, &fields)?),
            Some(&"Btrfs") if index == last => {
                let [_, tool_version] = fields.as_slice() else {
                    return Err(BtrfsError::unexpected(Report::FilesystemShow, line));
                };
                version = tool_version.to_string();
            }
            Some(_) => return Err(BtrfsError::unexpected(Report::FilesystemShow, line)),
        }
    }

    Ok(Filesystem::new(
        label,
        uuid,
        total_devices,
        fs_bytes_used,
        version,
        devices,
    ))
}

fn parse_label_line(line: &str) -> Result<(String, String)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let ["Label:", label, "uuid:", uuid] = fields.as_slice() else {
        return Err(BtrfsError::unexpected(Report::FilesystemShow, line));
    };

    Ok((label.trim_matches('\'').to_string(), uuid.to_string()))
}

fn parse_total_line(line: &str) -> Result<(u64, u64)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let ["Total", "devices", count, "FS", "bytes", "used", used] = fields.as_slice() else {
        return Err(BtrfsError::unexpected(Report::FilesystemShow, line));
    };

    let count = count
        .parse::<u64>()
        .map_err(|_| BtrfsError::malformed("total devices", line))?;

    Ok((count, parse_size(used)?))
}

fn parse_device_line(line: &str, fields: &[&str]) -> Result<Device> {
    let ["devid", devid, "size", size, "used", used, "path", path] = fields else {
        return Err(BtrfsError::unexpected(Report::FilesystemShow, line));
    };

    Ok(Device {
        devid: devid.to_string(),
        size: parse_size(size)?,
        used: parse_size(used)?,
        path: path.to_string(),
    })
}
