//! Parallax Tool - decode calibration and identity dumps
//!
//! Runs the same codec paths the driver uses at bring-up against raw blobs
//! captured to disk, for bench debugging of devices and flash images.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

use parallax_core::{Calibration, CalibrationTableId};
use parallax_monitor::tables::{verify_table_checksum, TableHeader};
use parallax_monitor::{decode_field, parse_calibration_table, GvdField, GVD_SIZE};

#[derive(Parser, Debug)]
#[command(name = "parallax")]
#[command(about = "Decode depth-camera calibration and identity dumps")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode one raw calibration-table dump and print the derived record
    Table {
        /// Path to the raw table blob
        path: PathBuf,
    },
    /// Extract identity fields from a version/identity blob dump
    Identity {
        /// Path to the blob dump
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Table { path } => {
            let report = decode_table(&path)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Identity { path } => {
            let (serial, firmware) = decode_identity(&path)?;
            println!("serial: {serial}");
            println!("firmware: {firmware}");
        }
    }
    Ok(())
}

fn decode_table(path: &Path) -> Result<serde_json::Value> {
    let raw = fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    let header =
        TableHeader::read_from(&raw).context("dump is shorter than a table header")?;
    if !verify_table_checksum(&header, &raw) {
        bail!("table checksum mismatch, dump rejected");
    }

    let table_id = match CalibrationTableId::from_raw(header.table_type) {
        Some(id) => id,
        None => bail!("unknown table type {}", header.table_type),
    };

    let mut calib = Calibration::default();
    parse_calibration_table(&mut calib, table_id, &raw)?;

    Ok(serde_json::json!({
        "table_id": table_id,
        "version": format!("{}.{}", header.version >> 8, header.version & 0xFF),
        "table_size": header.table_size,
        "calibration": calib,
    }))
}

fn decode_identity(path: &Path) -> Result<(String, String)> {
    let raw = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if raw.len() < GVD_SIZE {
        warn!(len = raw.len(), "identity dump shorter than {GVD_SIZE} bytes, padding");
    }

    let mut blob = vec![0u8; GVD_SIZE];
    let n = raw.len().min(GVD_SIZE);
    blob[..n].copy_from_slice(&raw[..n]);

    Ok((
        decode_field(&blob, GvdField::AsicModuleSerial),
        decode_field(&blob, GvdField::FirmwareVersion),
    ))
}
