// SPDX-License-Identifier: GPL-3.0-only

//! Parsing of `btrfs subvolume list` and `btrfs subvolume show`

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use fsutils_types::Subvolume;

use crate::diagnostics::{Diagnostics, Report};
use crate::error::{BtrfsError, Result};

const CREATION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const CREATION_TIME_WITH_OFFSET_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Parse output from `btrfs subvolume list`, returning the relative paths
///
/// Expected format:
/// ```text
/// ID 256 gen 123 top level 5 path @
/// ID 257 gen 124 top level 5 path @home
/// ```
pub fn parse_subvolume_list<S: AsRef<str>>(
    lines: &[S],
    diagnostics: &dyn Diagnostics,
) -> Result<Vec<String>> {
    let mut paths = Vec::new();

    for line in lines.iter().map(AsRef::as_ref) {
        diagnostics.raw_line(Report::SubvolumeList, line);

        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [] => continue,
            ["ID", _, "gen", _, "top", "level", _, "path", path] => paths.push(path.to_string()),
            _ => return Err(BtrfsError::unexpected(Report::SubvolumeList, line)),
        }
    }

    Ok(paths)
}

type Setter = fn(&mut Subvolume, &str) -> Option<()>;

/// Keywords of `subvolume show`, matched case-insensitively.
///
/// Both the old (`Object ID`, `Top Level`) and current (`Subvolume ID`,
/// `Top level ID`) spellings are listed.
const KEYWORDS: &[(&str, Setter)] = &[
    ("Name", set_name),
    ("uuid", set_uuid),
    ("Parent uuid", set_parent_uuid),
    ("Received UUID", ignore),
    ("Creation time", set_creation_time),
    ("Object ID", set_id),
    ("Subvolume ID", set_id),
    ("Generation (Gen)", set_generation),
    ("Generation", set_generation),
    ("Gen at creation", set_gen_at_creation),
    ("Parent", set_parent),
    ("Parent ID", set_parent),
    ("Top Level", set_top_level),
    ("Top level ID", set_top_level),
    // TODO: model flags (readonly) and the snapshot list
    ("Flags", ignore),
    ("Snapshot(s)", ignore),
    ("Send transid", ignore),
    ("Send time", ignore),
    ("Receive transid", ignore),
    ("Receive time", ignore),
    ("Quota group", ignore),
];

/// Parse output from `btrfs subvolume show` for the subvolume at `path`
///
/// The first line echoes the queried path and is skipped. Lines are
/// `Keyword: value`; unknown keywords and lines without a colon are ignored.
/// Lines indented deeper than `Snapshot(s):` are snapshot names, never
/// keywords, even when a name contains a colon.
pub fn parse_subvolume_show<S: AsRef<str>>(
    path: &str,
    lines: &[S],
    diagnostics: &dyn Diagnostics,
) -> Result<Subvolume> {
    let Some((first, rest)) = lines.split_first() else {
        return Err(BtrfsError::InsufficientOutput {
            report: Report::SubvolumeShow,
            lines: 0,
        });
    };
    diagnostics.raw_line(Report::SubvolumeShow, first.as_ref());

    let mut subvolume = Subvolume {
        path: path.to_string(),
        ..Subvolume::default()
    };

    let mut snapshot_indent = None;

    for line in rest.iter().map(AsRef::as_ref) {
        diagnostics.raw_line(Report::SubvolumeShow, line);

        let indent = line.len() - line.trim_start().len();
        if let Some(list_indent) = snapshot_indent {
            if indent > list_indent {
                continue;
            }
            snapshot_indent = None;
        }

        let Some((keyword, value)) = line.split_once(':') else {
            continue;
        };
        let keyword = keyword.trim();

        let Some(&(name, setter)) = KEYWORDS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(keyword))
        else {
            tracing::debug!(keyword, "ignoring unknown subvolume field");
            continue;
        };

        if name == "Snapshot(s)" {
            snapshot_indent = Some(indent);
        }

        setter(&mut subvolume, value.trim()).ok_or_else(|| BtrfsError::malformed(name, line))?;
    }

    Ok(subvolume)
}

fn ignore(_: &mut Subvolume, _: &str) -> Option<()> {
    Some(())
}

fn set_name(subvolume: &mut Subvolume, value: &str) -> Option<()> {
    subvolume.name = value.to_string();
    Some(())
}

fn set_uuid(subvolume: &mut Subvolume, value: &str) -> Option<()> {
    subvolume.uuid = value.to_string();
    Some(())
}

fn set_parent_uuid(subvolume: &mut Subvolume, value: &str) -> Option<()> {
    // "-" means the subvolume is not a snapshot
    if value != "-" {
        subvolume.parent_uuid = value.to_string();
    }
    Some(())
}

fn set_creation_time(subvolume: &mut Subvolume, value: &str) -> Option<()> {
    if value != "-" {
        subvolume.creation_time = Some(parse_creation_time(value)?);
    }
    Some(())
}

fn set_id(subvolume: &mut Subvolume, value: &str) -> Option<()> {
    subvolume.id = value.to_string();
    Some(())
}

fn set_generation(subvolume: &mut Subvolume, value: &str) -> Option<()> {
    subvolume.generation = value.parse().ok()?;
    Some(())
}

fn set_gen_at_creation(subvolume: &mut Subvolume, value: &str) -> Option<()> {
    subvolume.gen_at_creation = value.parse().ok()?;
    Some(())
}

fn set_parent(subvolume: &mut Subvolume, value: &str) -> Option<()> {
    subvolume.parent = value.parse().ok()?;
    Some(())
}

fn set_top_level(subvolume: &mut Subvolume, value: &str) -> Option<()> {
    subvolume.top_level = value.parse().ok()?;
    Some(())
}

/// `2014-05-14 14:28:43`, optionally followed by a UTC offset (`+0200`).
/// Times without an offset are taken as UTC.
fn parse_creation_time(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, CREATION_TIME_WITH_OFFSET_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, CREATION_TIME_FORMAT)
                .ok()
                .map(|naive| naive.and_utc().fixed_offset())
        })
}
