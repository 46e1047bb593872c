//! Configuration type definitions

use dcplus_core::{CombineMode, LogLevel, TimestampMode};
use serde::{Deserialize, Serialize};

/// Application settings (.dcplus/config.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub filter: FilterSettings,

    #[serde(default)]
    pub ui: UiSettings,
}

/// Log store settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreSettings {
    /// Maximum number of records kept; oldest are evicted first
    #[serde(default = "default_max_logs")]
    pub max_logs: usize,

    /// Write `.dcplus/logs.json`
    #[serde(default = "default_true")]
    pub persist: bool,

    /// Persistence coalescing window
    #[serde(default = "default_write_debounce_ms")]
    pub write_debounce_ms: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            max_logs: default_max_logs(),
            persist: true,
            write_debounce_ms: default_write_debounce_ms(),
        }
    }
}

/// Initial filter bar state
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FilterSettings {
    #[serde(default = "default_levels")]
    pub default_levels: Vec<LogLevel>,

    #[serde(default)]
    pub use_regex: bool,

    #[serde(default)]
    pub combine_mode: CombineMode,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            default_levels: default_levels(),
            use_regex: false,
            combine_mode: CombineMode::And,
        }
    }
}

/// UI settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UiSettings {
    #[serde(default)]
    pub timestamp_mode: TimestampMode,

    /// Hide timestamps when the log view is narrower than this (columns)
    #[serde(default = "default_auto_hide_timestamps_width")]
    pub auto_hide_timestamps_width: u16,

    /// Records materialized above and below the visible window
    #[serde(default = "default_buffer_rows")]
    pub buffer_rows: usize,

    /// Rows from the bottom that still count as following the tail
    #[serde(default = "default_follow_threshold")]
    pub follow_threshold: u64,

    #[serde(default)]
    pub compact: bool,

    #[serde(default = "default_true")]
    pub highlight_tags: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            timestamp_mode: TimestampMode::Absolute,
            auto_hide_timestamps_width: default_auto_hide_timestamps_width(),
            buffer_rows: default_buffer_rows(),
            follow_threshold: default_follow_threshold(),
            compact: false,
            highlight_tags: true,
        }
    }
}

fn default_max_logs() -> usize {
    10_000
}

fn default_write_debounce_ms() -> u64 {
    500
}

fn default_levels() -> Vec<LogLevel> {
    vec![LogLevel::Info, LogLevel::Warn, LogLevel::Error]
}

fn default_auto_hide_timestamps_width() -> u16 {
    60
}

fn default_buffer_rows() -> usize {
    10
}

fn default_follow_threshold() -> u64 {
    2
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.store.max_logs, 10_000);
        assert_eq!(settings.store.write_debounce_ms, 500);
        assert_eq!(settings.ui.buffer_rows, 10);
        assert_eq!(
            settings.filter.default_levels,
            vec![LogLevel::Info, LogLevel::Warn, LogLevel::Error]
        );
    }

    #[test]
    fn test_partial_sections() {
        let settings: Settings = toml::from_str(
            r#"
            [store]
            max_logs = 50

            [filter]
            default_levels = ["debug", "error"]
            combine_mode = "or"

            [ui]
            timestamp_mode = "relative"
            "#,
        )
        .unwrap();
        assert_eq!(settings.store.max_logs, 50);
        assert!(settings.store.persist);
        assert_eq!(settings.filter.default_levels, vec![LogLevel::Debug, LogLevel::Error]);
        assert_eq!(settings.filter.combine_mode, CombineMode::Or);
        assert_eq!(settings.ui.timestamp_mode, TimestampMode::Relative);
        assert!(settings.ui.highlight_tags);
    }

    #[test]
    fn test_unknown_level_rejected() {
        let res: Result<Settings, _> = toml::from_str("[filter]\ndefault_levels = [\"loud\"]");
        assert!(res.is_err());
    }
}
