// SPDX-License-Identifier: GPL-3.0-only

//! CLI wrapper around the fsutils-btrfs library for manual inspection

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use fsutils_btrfs::{Filesystem, FilesystemReader, ReaderConfig, accounted_used};
use fsutils_types::{DfData, Subvolume, bytes_to_pretty};
use serde::Serialize;

/// Report on a mounted BTRFS filesystem
#[derive(Parser)]
#[command(name = "fsutils-btrfs-cli")]
#[command(about = "Inspect BTRFS devices, space usage and subvolumes", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Everything: summary, devices, space usage and subvolumes
    Info {
        /// Mount point of the BTRFS filesystem
        mount_point: PathBuf,
    },
    /// Label, UUID and devices from `btrfs filesystem show`
    Show {
        /// Mount point of the BTRFS filesystem
        mount_point: PathBuf,
    },
    /// Allocation classes from `btrfs filesystem df`
    Df {
        /// Mount point of the BTRFS filesystem
        mount_point: PathBuf,
    },
    /// Subvolume details
    Subvolumes {
        /// Mount point of the BTRFS filesystem
        mount_point: PathBuf,
    },
    /// Total, allocated and used bytes
    Usage {
        /// Mount point of the BTRFS filesystem
        mount_point: PathBuf,
    },
}

#[derive(Serialize)]
struct UsageSummary {
    total_bytes: u64,
    allocated_bytes: u64,
    used_bytes: u64,
}

fn main() -> Result<()> {
    // Initialize tracing to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ReaderConfig::load(path)?,
        None => ReaderConfig::default(),
    };
    let reader = FilesystemReader::from_config(config)?;

    match &cli.command {
        Commands::Info { mount_point } => {
            let filesystem = reader.read(mount_point)?;
            if cli.json {
                print_json(&filesystem)?;
            } else {
                print_summary(&filesystem);
                print_df(filesystem.df());
                print_subvolumes(filesystem.subvolumes());
                match usage_summary(&filesystem) {
                    Ok(usage) => print_usage(&usage),
                    Err(err) => tracing::warn!("Used bytes unavailable: {err}"),
                }
            }
        }
        Commands::Show { mount_point } => {
            let filesystem = reader.read_show(mount_point)?;
            if cli.json {
                print_json(&filesystem)?;
            } else {
                print_summary(&filesystem);
            }
        }
        Commands::Df { mount_point } => {
            let df = reader.read_df(mount_point)?;
            if cli.json {
                print_json(&df)?;
            } else {
                print_df(&df);
            }
        }
        Commands::Subvolumes { mount_point } => {
            let subvolumes = reader.read_subvolumes(mount_point)?;
            if cli.json {
                print_json(&subvolumes)?;
            } else {
                print_subvolumes(&subvolumes);
            }
        }
        Commands::Usage { mount_point } => {
            let filesystem = read_without_subvolumes(&reader, mount_point)?;
            let usage = usage_summary(&filesystem)?;
            if cli.json {
                print_json(&usage)?;
            } else {
                print_usage(&usage);
            }
        }
    }

    Ok(())
}

fn read_without_subvolumes(
    reader: &FilesystemReader<fsutils_btrfs::BtrfsCli>,
    mount_point: &Path,
) -> Result<Filesystem> {
    let filesystem = reader.read_show(mount_point)?;
    Ok(filesystem.with_df(reader.read_df(mount_point)?))
}

fn usage_summary(filesystem: &Filesystem) -> Result<UsageSummary> {
    Ok(UsageSummary {
        total_bytes: filesystem.total_bytes(),
        allocated_bytes: filesystem.allocated_bytes(),
        used_bytes: filesystem.used_bytes()?,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn print_summary(filesystem: &Filesystem) {
    println!("Label:   {}", filesystem.label());
    println!("UUID:    {}", filesystem.uuid());
    if !filesystem.version().is_empty() {
        println!("Version: {}", filesystem.version());
    }
    println!(
        "Devices: {} ({} used)",
        filesystem.total_devices(),
        bytes_to_pretty(&filesystem.fs_bytes_used(), false)
    );
    for device in filesystem.devices() {
        println!(
            "  devid {:>3}  {}  size {}  used {}",
            device.devid,
            device.path,
            bytes_to_pretty(&device.size, false),
            bytes_to_pretty(&device.used, false)
        );
    }
}

fn print_df(df: &[DfData]) {
    for record in df {
        println!("{}", df_row(record));
    }
}

/// One `df` line; an unknown redundancy level only affects the accounted column
fn df_row(record: &DfData) -> String {
    let accounted = match accounted_used(record) {
        Ok(bytes) => bytes_to_pretty(&bytes, false),
        Err(_) => format!("unknown level {}", record.level),
    };
    format!(
        "{:<14} {:<8} total {}  used {}  accounted {}",
        record.class,
        record.level,
        bytes_to_pretty(&record.total, false),
        bytes_to_pretty(&record.used, false),
        accounted
    )
}

fn print_subvolumes(subvolumes: &[Subvolume]) {
    for subvolume in subvolumes {
        let created = subvolume
            .creation_time
            .map(|time| time.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>6}  gen {:<8} top {:<6} {}  {}",
            subvolume.id, subvolume.generation, subvolume.top_level, created, subvolume.path
        );
    }
}

fn print_usage(usage: &UsageSummary) {
    println!("Total:     {}", bytes_to_pretty(&usage.total_bytes, true));
    println!("Allocated: {}", bytes_to_pretty(&usage.allocated_bytes, true));
    println!("Used:      {}", bytes_to_pretty(&usage.used_bytes, true));
}
