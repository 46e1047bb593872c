//! Domain type definitions

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output category the debug adapter uses when none is supplied
pub const DEFAULT_CATEGORY: &str = "console";

/// Output category routed from the program's standard error stream
pub const STDERR_CATEGORY: &str = "stderr";

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// All levels, least to most severe
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    /// Lowercase wire name (`"warn"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Get display prefix for log level
    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DBG",
            LogLevel::Info => "INF",
            LogLevel::Warn => "WRN",
            LogLevel::Error => "ERR",
        }
    }

    /// Get numeric severity value for comparison
    pub fn severity(&self) -> u8 {
        match self {
            LogLevel::Debug => 0,
            LogLevel::Info => 1,
            LogLevel::Warn => 2,
            LogLevel::Error => 3,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    /// Accepts the wire names plus the common aliases producers emit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" | "exception" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// Grouping marker attached by the debug adapter to output events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupMarker {
    Start,
    StartCollapsed,
    End,
}

impl GroupMarker {
    /// Whether this marker opens a group
    pub fn is_start(&self) -> bool {
        matches!(self, GroupMarker::Start | GroupMarker::StartCollapsed)
    }
}

/// A single classified line of debug output
///
/// Serialized field-for-field as the persisted snapshot format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub id: String,
    /// Arrival time in milliseconds since the Unix epoch
    pub timestamp: i64,
    pub level: LogLevel,
    pub message: String,
    pub category: String,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupMarker>,
}

impl LogRecord {
    /// Records without a group marker carry content
    pub fn is_content(&self) -> bool {
        self.group.is_none()
    }

    /// Local wall-clock time as `HH:MM:SS.mmm`
    pub fn formatted_time(&self) -> String {
        match Local.timestamp_millis_opt(self.timestamp).single() {
            Some(dt) => dt.format("%H:%M:%S%.3f").to_string(),
            None => "--:--:--.---".to_string(),
        }
    }

    /// Offset from `origin_ms` as `+MM:SS.mmm`, or `+H:MM:SS.mmm` past an hour
    pub fn formatted_relative(&self, origin_ms: i64) -> String {
        format_relative(self.timestamp.saturating_sub(origin_ms))
    }

    /// Plain-text export line: `"{time} {LEVEL} {message}"`
    pub fn export_line(&self, with_time: bool) -> String {
        if with_time {
            format!(
                "{} {} {}",
                self.formatted_time(),
                self.level.as_str().to_ascii_uppercase(),
                self.message
            )
        } else {
            self.message.clone()
        }
    }
}

fn format_relative(delta_ms: i64) -> String {
    let delta = delta_ms.max(0);
    let millis = delta % 1000;
    let total_secs = delta / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    if hours > 0 {
        format!("+{hours}:{mins:02}:{secs:02}.{millis:03}")
    } else {
        format!("+{mins:02}:{secs:02}.{millis:03}")
    }
}

/// How timestamps are shown next to records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampMode {
    #[default]
    Absolute,
    Relative,
    Hidden,
}

impl TimestampMode {
    /// Cycle absolute → relative → hidden → absolute
    pub fn next(self) -> Self {
        match self {
            TimestampMode::Absolute => TimestampMode::Relative,
            TimestampMode::Relative => TimestampMode::Hidden,
            TimestampMode::Hidden => TimestampMode::Absolute,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimestampMode::Absolute => "abs",
            TimestampMode::Relative => "rel",
            TimestampMode::Hidden => "off",
        }
    }
}
