//! Persists the inventory and report of a run.
//!
//! Every run writes into its own directory named after the local time it
//! started (`2024-05-01_13-37-00`). Run directories older than the retention
//! window are removed before a new one is created; anything in the base
//! directory whose name is not such a timestamp is left alone.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime, TimeDelta};
use sshcheck_common::config::InventoryVar;
use thiserror::Error;
use tracing::{debug, warn};

use crate::inventory::Inventory;
use crate::report::Report;

pub const INVENTORY_FILE: &str = "ansible_inventory.ini";
pub const REPORT_FILE: &str = "ssh_check_results.csv";
pub const RUN_DIR_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Removes stale runs below `base` and creates the directory for this one.
pub fn prepare_run_dir(base: &Path, retention_days: u32) -> Result<PathBuf, OutputError> {
    let now: NaiveDateTime = Local::now().naive_local();
    let retention = TimeDelta::try_days(i64::from(retention_days)).unwrap_or(TimeDelta::MAX);

    cleanup_old_runs(base, retention, now);
    create_run_dir(base, now)
}

pub fn create_run_dir(base: &Path, now: NaiveDateTime) -> Result<PathBuf, OutputError> {
    let path = base.join(now.format(RUN_DIR_FORMAT).to_string());
    fs::create_dir_all(&path).map_err(|source| OutputError::CreateDir {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Deletes run directories that started before `now - retention`.
///
/// Failures are logged and skipped. Returns the directories that were removed.
pub fn cleanup_old_runs(base: &Path, retention: TimeDelta, now: NaiveDateTime) -> Vec<PathBuf> {
    let mut removed: Vec<PathBuf> = Vec::new();

    let Some(threshold) = now.checked_sub_signed(retention) else {
        return removed;
    };

    let entries = match fs::read_dir(base) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return removed,
        Err(e) => {
            warn!("Could not list {}: {e}", base.display());
            return removed;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let Some(started) = entry
            .file_name()
            .to_str()
            .and_then(|name| NaiveDateTime::parse_from_str(name, RUN_DIR_FORMAT).ok())
        else {
            continue;
        };

        if started >= threshold {
            continue;
        }

        match fs::remove_dir_all(&path) {
            Ok(()) => {
                debug!("Deleted old run directory {}", path.display());
                removed.push(path);
            }
            Err(e) => warn!("Could not delete {}: {e}", path.display()),
        }
    }

    removed
}

pub fn write_inventory(
    dir: &Path,
    inventory: &Inventory,
    vars: &[InventoryVar],
) -> Result<PathBuf, OutputError> {
    let path = dir.join(INVENTORY_FILE);
    fs::write(&path, inventory.render(vars)).map_err(|source| OutputError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

pub fn write_report(dir: &Path, report: &Report) -> Result<PathBuf, OutputError> {
    let path = dir.join(REPORT_FILE);
    let file = File::create(&path).map_err(|source| OutputError::Write {
        path: path.clone(),
        source,
    })?;

    report
        .write_csv(BufWriter::new(file))
        .map_err(|source| OutputError::Encode {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
