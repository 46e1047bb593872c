//! Persisted record snapshot (`.dcplus/logs.json`)
//!
//! A pretty-printed JSON array of [`LogRecord`]s. Writers take an exclusive
//! `fs2` lock and readers a shared one, so the query tool never sees a
//! half-written file while the console is flushing.

use fs2::FileExt;
use serde_json::Value;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::LogRecord;

/// Snapshot directory, relative to the workspace
pub const SNAPSHOT_DIR: &str = ".dcplus";

/// Snapshot file name inside [`SNAPSHOT_DIR`]
pub const SNAPSHOT_FILE: &str = "logs.json";

/// `<dir>/logs.json`
pub fn snapshot_path(dir: &Path) -> PathBuf {
    dir.join(SNAPSHOT_FILE)
}

/// Outcome of validating a bulk load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub records: Vec<LogRecord>,
    /// Entries that failed validation and were dropped
    pub skipped: usize,
}

/// Validate each entry independently.
///
/// An entry is valid when it deserializes as a [`LogRecord`] and its message
/// is non-empty. Zero valid entries rejects the whole load.
pub fn validate_entries(entries: Vec<Value>) -> Result<LoadReport> {
    let mut records = Vec::with_capacity(entries.len());
    let mut skipped = 0;

    for entry in entries {
        match serde_json::from_value::<LogRecord>(entry) {
            Ok(record) if !record.message.is_empty() => records.push(record),
            Ok(_) => skipped += 1,
            Err(e) => {
                tracing::debug!("skipping invalid log entry: {e}");
                skipped += 1;
            }
        }
    }

    if records.is_empty() {
        return Err(Error::LoadRejected { skipped });
    }
    if skipped > 0 {
        tracing::warn!("loaded {} log entries, skipped {skipped} invalid", records.len());
    }
    Ok(LoadReport { records, skipped })
}

/// Parse snapshot text into raw entries without validating them.
pub fn parse_entries(text: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(entries) => Ok(entries),
        other => Err(Error::protocol(format!(
            "expected a JSON array of log entries, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Snapshot text, read under a shared lock
pub fn read_snapshot_text(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::snapshot(path, "no snapshot found"),
        _ => Error::Io(e),
    })?;
    file.lock_shared()
        .map_err(|e| Error::snapshot(path, format!("failed to lock: {e}")))?;
    let mut text = String::new();
    file.read_to_string(&mut text)?;
    Ok(text)
}

/// Read the snapshot for querying. Invalid entries are skipped; an empty
/// snapshot is fine.
pub fn read_snapshot(path: &Path) -> Result<Vec<LogRecord>> {
    let text = read_snapshot_text(path)?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let entries = parse_entries(&text)?;
    if entries.is_empty() {
        return Ok(Vec::new());
    }
    match validate_entries(entries) {
        Ok(report) => Ok(report.records),
        Err(Error::LoadRejected { .. }) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Write the whole snapshot under an exclusive lock.
pub fn write_snapshot<'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a LogRecord>,
) -> Result<()> {
    let records: Vec<&LogRecord> = records.into_iter().collect();
    let content = serde_json::to_string_pretty(&records)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::snapshot(path, format!("failed to create directory: {e}")))?;
    }

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| Error::snapshot(path, format!("failed to open: {e}")))?;

    // Truncate only once the lock is held so readers never see an empty file
    file.lock_exclusive()
        .map_err(|e| Error::snapshot(path, format!("failed to lock: {e}")))?;
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(content.as_bytes())?;
    file.flush()?;

    tracing::trace!("wrote {} records to {}", records.len(), path.display());
    Ok(())
}
