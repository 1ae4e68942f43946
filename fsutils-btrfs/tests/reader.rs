// SPDX-License-Identifier: GPL-3.0-only

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use fsutils_btrfs::{
    AllocationClass, BtrfsError, CommandOutput, FilesystemReader, ReaderConfig, ReportSource,
    Result,
};

/// Replays recorded `btrfs` output keyed by the rendered arguments.
#[derive(Default)]
struct Canned {
    outputs: HashMap<String, CommandOutput>,
    calls: Mutex<Vec<String>>,
}

impl Canned {
    fn stdout(mut self, args: &str, lines: &[&str]) -> Self {
        self.outputs.insert(
            args.to_string(),
            CommandOutput {
                command: format!("btrfs {args}"),
                stdout_lines: lines.iter().map(ToString::to_string).collect(),
                stderr_lines: Vec::new(),
                success: true,
            },
        );
        self
    }

    fn stderr(mut self, args: &str, lines: &[&str]) -> Self {
        self.outputs.insert(
            args.to_string(),
            CommandOutput {
                command: format!("btrfs {args}"),
                stdout_lines: Vec::new(),
                stderr_lines: lines.iter().map(ToString::to_string).collect(),
                success: false,
            },
        );
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ReportSource for Canned {
    fn run(&self, args: &[String]) -> Result<CommandOutput> {
        let key = args.join(" ");
        self.calls.lock().unwrap().push(key.clone());
        self.outputs
            .get(&key)
            .cloned()
            .ok_or_else(|| BtrfsError::ToolFailed {
                command: key,
                stderr: "no canned output".to_string(),
            })
    }
}

// 16.01 * 2^30 rounded to the nearest byte
const USED_16_01_GIB: u64 = (1601 * (1 << 30) + 50) / 100;

const SHOW: &[&str] = &[
    "Label: none  uuid: b7c23711-6b9e-46a8-b451-4b3f79c7bc46",
    "\tTotal devices 2 FS bytes used 14.67GiB",
    "\tdevid    1 size 40.00GiB used 16.01GiB path /dev/sdc1",
    "\tdevid    2 size 40.00GiB used 16.01GiB path /dev/sdd1",
    "",
    "Btrfs v3.12",
];

const DF: &[&str] = &[
    "Data, RAID1: total=15.00GiB, used=14.17GiB",
    "System, RAID1: total=8.00MiB, used=16.00KiB",
    "Metadata, RAID1: total=1.00GiB, used=512.00MiB",
];

const LIST: &[&str] = &[
    "ID 256 gen 20 top level 5 path home",
    "ID 257 gen 21 top level 5 path snaps/home-1",
    "ID 258 gen 22 top level 5 path var",
];

fn show_detail(name: &str, id: u32) -> Vec<String> {
    vec![
        format!("/mnt/pool/{name}"),
        format!("\tName: \t\t\t{name}"),
        format!("\tuuid: \t\t\t0000-{id}"),
        "\tParent uuid: \t\t-".to_string(),
        "\tCreation time: \t\t2014-05-14 14:28:43".to_string(),
        format!("\tObject ID: \t\t{id}"),
        "\tGeneration (Gen): \t20".to_string(),
        "\tGen at creation: \t7".to_string(),
        "\tParent: \t\t5".to_string(),
        "\tTop Level: \t\t5".to_string(),
        "\tFlags: \t\t\t-".to_string(),
        "\tSnapshot(s):".to_string(),
    ]
}

fn pool() -> Canned {
    let mut canned = Canned::default()
        .stdout("filesystem show /mnt/pool", SHOW)
        .stdout("filesystem df /mnt/pool", DF)
        .stdout("subvolume list /mnt/pool", LIST);

    for (relative, id) in [("home", 256), ("snaps/home-1", 257), ("var", 258)] {
        let lines = show_detail(relative.rsplit('/').next().unwrap(), id);
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        canned = canned.stdout(&format!("subvolume show /mnt/pool/{relative}"), &lines);
    }

    canned
}

fn config(detail_threads: Option<usize>) -> ReaderConfig {
    ReaderConfig {
        detail_threads,
        ..ReaderConfig::default()
    }
}

#[test]
fn assembles_the_full_filesystem() {
    let reader = FilesystemReader::new(pool(), config(Some(1)));
    let filesystem = reader.read(Path::new("/mnt/pool")).unwrap();

    assert_eq!(filesystem.uuid(), "b7c23711-6b9e-46a8-b451-4b3f79c7bc46");
    assert_eq!(filesystem.version(), "v3.12");
    assert_eq!(filesystem.devices().len(), 2);
    assert_eq!(filesystem.df().len(), 3);
    assert_eq!(filesystem.df()[0].class, AllocationClass::Data);

    let paths: Vec<&str> = filesystem
        .subvolumes()
        .iter()
        .map(|subvolume| subvolume.path.as_str())
        .collect();
    assert_eq!(paths, ["home", "snaps/home-1", "var"]);
    assert_eq!(filesystem.subvolumes()[1].name, "home-1");
    assert_eq!(filesystem.subvolumes()[1].id, "257");
}

#[test]
fn metrics_stay_distinct() {
    let reader = FilesystemReader::new(pool(), config(Some(1)));
    let filesystem = reader.read(Path::new("/mnt/pool")).unwrap();

    assert_eq!(filesystem.total_bytes(), 2 * 42_949_672_960);
    assert_eq!(filesystem.allocated_bytes(), 2 * USED_16_01_GIB);

    let raw_used: u64 = filesystem.df().iter().map(|record| record.used).sum();
    assert_eq!(filesystem.used_bytes().unwrap(), 2 * raw_used);
}

#[test]
fn parallel_details_keep_list_order() {
    let reader = FilesystemReader::new(pool(), config(Some(3)));
    let subvolumes = reader.read_subvolumes(Path::new("/mnt/pool")).unwrap();

    let ids: Vec<&str> = subvolumes.iter().map(|subvolume| subvolume.id.as_str()).collect();
    assert_eq!(ids, ["256", "257", "258"]);
}

#[test]
fn details_follow_the_list() {
    let canned = pool();
    let reader = FilesystemReader::new(canned, config(Some(1)));
    reader.read(Path::new("/mnt/pool")).unwrap();

    let calls = reader_calls(&reader);
    let list = calls
        .iter()
        .position(|call| call == "subvolume list /mnt/pool")
        .unwrap();
    assert!(
        calls
            .iter()
            .enumerate()
            .filter(|(_, call)| call.starts_with("subvolume show"))
            .all(|(index, _)| index > list)
    );
    assert_eq!(calls.len(), 6);
}

#[test]
fn stderr_fails_the_acquisition() {
    let canned = pool().stderr(
        "filesystem df /mnt/pool",
        &["ERROR: can't access '/mnt/pool': Permission denied"],
    );
    let reader = FilesystemReader::new(canned, config(Some(1)));

    let err = reader.read(Path::new("/mnt/pool")).unwrap_err();
    assert!(matches!(
        err,
        BtrfsError::ToolFailed { ref command, ref stderr }
            if command == "btrfs filesystem df /mnt/pool" && stderr.contains("Permission denied")
    ));
}

#[test]
fn empty_show_output_is_insufficient() {
    let canned = pool().stdout("filesystem show /mnt/pool", &[]);
    let reader = FilesystemReader::new(canned, config(Some(1)));

    assert!(matches!(
        reader.read(Path::new("/mnt/pool")),
        Err(BtrfsError::InsufficientOutput { lines: 0, .. })
    ));
}

#[test]
fn subvolumes_can_be_skipped() {
    let config = ReaderConfig {
        collect_subvolumes: false,
        ..ReaderConfig::default()
    };
    let reader = FilesystemReader::new(pool(), config);
    let filesystem = reader.read(Path::new("/mnt/pool")).unwrap();

    assert!(filesystem.subvolumes().is_empty());
    assert_eq!(reader_calls(&reader).len(), 2);
}

#[test]
fn empty_path_is_rejected() {
    let reader = FilesystemReader::new(pool(), config(Some(1)));
    assert!(matches!(
        reader.read(Path::new("")),
        Err(BtrfsError::InvalidPath(_))
    ));
}

#[test]
fn details_resolve_against_the_top_level_mount() {
    let reader = FilesystemReader::new(pool(), config(Some(1)));
    reader.read_subvolume(Path::new("/mnt/pool"), "snaps/home-1").unwrap();
    assert_eq!(reader_calls(&reader), ["subvolume show /mnt/pool/snaps/home-1"]);
}

#[cfg(unix)]
#[test]
fn non_utf8_path_is_rejected_before_running() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let reader = FilesystemReader::new(pool(), config(Some(1)));
    let path = Path::new(OsStr::from_bytes(b"/mnt/\xff"));

    assert!(matches!(reader.read(path), Err(BtrfsError::InvalidPath(_))));
    assert!(reader_calls(&reader).is_empty());
}

fn reader_calls(reader: &FilesystemReader<Canned>) -> Vec<String> {
    reader.source().calls()
}
