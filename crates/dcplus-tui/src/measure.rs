//! Row measurement for the virtual viewport
//!
//! The log view wraps by character at the content width left over after the
//! prefix columns. Measurement and rendering share [`wrap_ranges`], so a
//! record's cached height is exactly the number of rows it draws.

use std::ops::Range;

use dcplus_app::{AppState, HeightMeasurer};
use dcplus_core::{compact_message, LogRecord, TimestampMode};
use unicode_width::UnicodeWidthChar;

/// `HH:MM:SS.mmm` plus a separating space
pub const TIMESTAMP_COLUMN: u16 = 13;

/// Level icon plus a separating space
pub const LEVEL_COLUMN: u16 = 2;

/// Width of the columns before the message text
pub fn prefix_width(show_timestamps: bool) -> u16 {
    if show_timestamps {
        TIMESTAMP_COLUMN + LEVEL_COLUMN
    } else {
        LEVEL_COLUMN
    }
}

/// Byte ranges of each screen row when `text` is wrapped at `width` columns.
///
/// Newlines always break; an empty line still takes a row. A character wider
/// than the remaining space moves to the next row.
pub fn wrap_ranges(text: &str, width: u16) -> Vec<Range<usize>> {
    let width = usize::from(width.max(1));
    let mut ranges = Vec::new();
    let mut line_start = 0;

    for raw in text.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let mut seg_start = line_start;
        let mut seg_width = 0;
        for (offset, ch) in line.char_indices() {
            let w = ch.width().unwrap_or(0);
            if seg_width > 0 && seg_width + w > width {
                ranges.push(seg_start..line_start + offset);
                seg_start = line_start + offset;
                seg_width = 0;
            }
            seg_width += w;
        }
        ranges.push(seg_start..line_start + line.len());
        line_start += raw.len() + 1;
    }
    ranges
}

/// Measures records the way [`crate::widgets::LogView`] draws them
#[derive(Debug, Clone, Copy)]
pub struct WrapMeasurer {
    prefix: u16,
    compact: bool,
}

impl WrapMeasurer {
    pub fn new(show_timestamps: bool, compact: bool) -> Self {
        Self {
            prefix: prefix_width(show_timestamps),
            compact,
        }
    }

    pub fn for_state(state: &AppState) -> Self {
        let show_timestamps = state.effective_timestamp_mode() != TimestampMode::Hidden;
        Self::new(show_timestamps, state.compact)
    }

    /// Columns left for message text in a container `width` wide
    pub fn text_width(&self, width: u16) -> u16 {
        width.saturating_sub(self.prefix).max(1)
    }
}

impl HeightMeasurer for WrapMeasurer {
    fn measure(&self, record: &LogRecord, width: u16) -> u16 {
        let width = self.text_width(width);
        let rows = if self.compact {
            wrap_ranges(&compact_message(&record.message), width).len()
        } else {
            wrap_ranges(&record.message, width).len()
        };
        u16::try_from(rows).unwrap_or(u16::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcplus_core::LogLevel;

    fn record(message: &str) -> LogRecord {
        LogRecord {
            id: "s-1".into(),
            timestamp: 0,
            level: LogLevel::Info,
            message: message.into(),
            category: "stdout".into(),
            session_id: "s".into(),
            group: None,
        }
    }

    fn segments<'a>(text: &'a str, width: u16) -> Vec<&'a str> {
        wrap_ranges(text, width)
            .into_iter()
            .map(|r| &text[r])
            .collect()
    }

    #[test]
    fn test_short_text_is_one_row() {
        assert_eq!(segments("hello", 10), vec!["hello"]);
    }

    #[test]
    fn test_wraps_at_width() {
        assert_eq!(segments("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_newlines_break_and_empty_lines_count() {
        assert_eq!(segments("a\n\nb", 10), vec!["a", "", "b"]);
        assert_eq!(segments("", 10), vec![""]);
        assert_eq!(segments("crlf\r\nnext", 10), vec!["crlf", "next"]);
    }

    #[test]
    fn test_wide_chars_do_not_split() {
        // Each CJK char is two columns wide
        assert_eq!(segments("日本語", 5), vec!["日本", "語"]);
    }

    #[test]
    fn test_zero_width_is_treated_as_one_column() {
        assert_eq!(wrap_ranges("abc", 0).len(), 3);
    }

    #[test]
    fn test_measurer_subtracts_prefix() {
        let with_time = WrapMeasurer::new(true, false);
        let without = WrapMeasurer::new(false, false);
        let rec = record(&"x".repeat(30));
        // 45 - 15 = 30 columns
        assert_eq!(with_time.measure(&rec, 45), 1);
        assert_eq!(with_time.measure(&rec, 44), 2);
        // 32 - 2 = 30 columns
        assert_eq!(without.measure(&rec, 32), 1);
    }

    #[test]
    fn test_compact_measures_displayed_text() {
        let rec = record("[APP] | 12:00:01 15ms | ready");
        let compact = WrapMeasurer::new(false, true);
        let full = WrapMeasurer::new(false, false);
        assert_eq!(compact.measure(&rec, 12), 1);
        assert!(full.measure(&rec, 12) > 1);
    }
}
