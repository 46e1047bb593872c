//! Headless mode - JSON event output without the TUI
//!
//! Ingests the debug adapter stream through the same pipeline as the
//! console (classify, store, persist) and prints each stored record to
//! stdout as NDJSON.
//!
//! # Example Output
//!
//! ```json
//! {"event":"session_started","session_id":"s1lq2x8k0","timestamp":1704700001000}
//! {"event":"log","id":"s1lq2x8k0-1704700001200-k3p9a","level":"warn","message":"disk low","category":"stdout","session_id":"s1lq2x8k0","timestamp":1704700001200}
//! {"event":"input_closed","records":1,"timestamp":1704700002000}
//! ```

pub mod runner;

use chrono::Utc;
use dcplus_core::LogRecord;
use serde::Serialize;
use std::io::{self, Write};
use tracing::error;

/// Events emitted in headless mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    SessionStarted {
        session_id: String,
        timestamp: i64,
    },

    SessionEnded {
        session_id: String,
        timestamp: i64,
    },

    /// A record as stored, after classification
    Log {
        id: String,
        level: String,
        message: String,
        category: String,
        session_id: String,
        timestamp: i64,
    },

    /// The input stream ended
    InputClosed { records: usize, timestamp: i64 },

    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }
        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn session_started(session_id: &str) -> Self {
        Self::SessionStarted {
            session_id: session_id.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn session_ended(session_id: &str) -> Self {
        Self::SessionEnded {
            session_id: session_id.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn log(record: &LogRecord) -> Self {
        Self::Log {
            id: record.id.clone(),
            level: record.level.as_str().to_string(),
            message: record.message.clone(),
            category: record.category.clone(),
            session_id: record.session_id.clone(),
            timestamp: record.timestamp,
        }
    }

    pub fn input_closed(records: usize) -> Self {
        Self::InputClosed {
            records,
            timestamp: Self::now(),
        }
    }

    pub fn error(message: impl Into<String>, fatal: bool) -> Self {
        Self::Error {
            message: message.into(),
            fatal,
            timestamp: Self::now(),
        }
    }
}
