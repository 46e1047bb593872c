//! `dcplus query` - retrieval over the persisted snapshot

use std::io::{self, Write};
use std::path::Path;

use dcplus_core::prelude::*;
use dcplus_core::{read_snapshot, run_query, snapshot_path, QueryRequest, QueryResponse};

/// Run `request` against `<logs_dir>/logs.json`.
pub fn query_dir(logs_dir: &Path, request: &QueryRequest) -> Result<QueryResponse> {
    let path = snapshot_path(logs_dir);
    let records = read_snapshot(&path)?;
    debug!("Query over {} records from {}", records.len(), path.display());
    Ok(run_query(&records, request))
}

/// Print the query response as pretty JSON on stdout
pub fn run_query_command(logs_dir: &Path, request: &QueryRequest) -> Result<()> {
    let response = query_dir(logs_dir, request)?;
    let json = serde_json::to_string_pretty(&response).context("Failed to encode query response")?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json).context("Failed to write query response")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcplus_core::{write_snapshot, LogLevel, LogRecord};
    use tempfile::TempDir;

    fn rec(n: i64, level: LogLevel, message: &str) -> LogRecord {
        LogRecord {
            id: format!("s-{n}"),
            timestamp: n,
            level,
            message: message.into(),
            category: "stdout".into(),
            session_id: "s".into(),
            group: None,
        }
    }

    #[test]
    fn test_query_dir_reads_snapshot() {
        let dir = TempDir::new().unwrap();
        let records = vec![
            rec(1, LogLevel::Info, "ready"),
            rec(2, LogLevel::Error, "boom"),
        ];
        write_snapshot(&snapshot_path(dir.path()), &records).unwrap();

        let request = QueryRequest {
            levels: Some(vec![LogLevel::Error]),
            ..QueryRequest::default()
        };
        let response = query_dir(dir.path(), &request).unwrap();
        assert_eq!(response.total, 2);
        assert_eq!(response.filtered, 1);
        assert_eq!(response.logs[0].message, "boom");
    }

    #[test]
    fn test_missing_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(query_dir(dir.path(), &QueryRequest::default()).is_err());
    }
}
