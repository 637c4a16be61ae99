use anyhow::Result;
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const OPERATION_LOG_FILE: &str = "operation_log.txt";

/// Application data directory, shared with the settings file
pub fn app_data_dir() -> PathBuf {
    match dirs::config_dir() {
        Some(config_dir) => config_dir.join("regen-agri"),
        None => PathBuf::from("."),
    }
}

fn log_path() -> PathBuf {
    app_data_dir().join(OPERATION_LOG_FILE)
}

pub fn log_file_path() -> String {
    log_path().display().to_string()
}

fn append_log_to(path: &Path, operation: &str, chain_id: u64, details: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(
        file,
        "[{}] chain_id={} operation={}",
        Utc::now().to_rfc3339(),
        chain_id,
        operation
    )?;
    for line in details.lines().filter(|l| !l.trim().is_empty()) {
        writeln!(file, "  {}", line)?;
    }
    writeln!(file)?;
    Ok(())
}

/// Append one operation (submit, verify, reject, decrypt, export) to the log.
/// A failed write is logged as a warning and reported as `false`.
pub fn record(operation: &str, chain_id: u64, details: impl AsRef<str>) -> bool {
    record_to(&log_path(), operation, chain_id, details.as_ref())
}

fn record_to(path: &Path, operation: &str, chain_id: u64, details: &str) -> bool {
    match append_log_to(path, operation, chain_id, details) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Failed to write operation log: {}", e);
            false
        }
    }
}

pub fn read_log() -> Result<String> {
    read_log_from(&log_path())
}

fn read_log_from(path: &Path) -> Result<String> {
    if path.exists() {
        Ok(fs::read_to_string(path)?)
    } else {
        Ok(String::new())
    }
}
