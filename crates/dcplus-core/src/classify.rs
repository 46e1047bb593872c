//! Line classification: cleaning and level detection
//!
//! A raw output line becomes a [`LogRecord`] in two steps. The text is
//! cleaned (runtime prefixes, platform log tags and color codes removed,
//! trailing whitespace trimmed), then an ordered table of matchers decides
//! the level. The first matcher that returns a level wins; the output
//! category is the fallback when none does.

use rand::Rng;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::ansi::{contains_ansi_codes, strip_ansi_codes};
use crate::types::{GroupMarker, LogLevel, LogRecord, STDERR_CATEGORY};

// ─────────────────────────────────────────────────────────────────
// Cleaning
// ─────────────────────────────────────────────────────────────────

/// `flutter:` prefix at the start of any line of the text
static RUNTIME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^flutter:\s*").expect("Runtime prefix regex is valid"));

/// Android-style `I/tag(1234):` prefix, anywhere in the text
static PLATFORM_TAG_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[VDIWEF]/[\w.-]+\s*\(\s*\d+\s*\):\s*").expect("Platform tag regex is valid")
});

/// Clean a raw output line for display and matching.
///
/// Leading indentation is preserved; only trailing whitespace is trimmed.
pub fn clean_message(raw: &str) -> String {
    let text = RUNTIME_PREFIX.replace_all(raw, "");
    let text = PLATFORM_TAG_PREFIX.replace_all(&text, "");
    let text = strip_ansi_codes(&text);
    text.trim_end().to_string()
}

// ─────────────────────────────────────────────────────────────────
// Level matchers
// ─────────────────────────────────────────────────────────────────

/// What a matcher gets to look at.
///
/// `cleaned` is the final message text. `uncleaned` still carries the
/// platform tag (color codes removed), which is the only place the
/// single-letter platform level survives.
#[derive(Debug, Clone, Copy)]
pub struct LineSubject<'a> {
    pub cleaned: &'a str,
    pub uncleaned: &'a str,
}

/// A single level heuristic
pub type LevelMatcher = fn(&LineSubject<'_>) -> Option<LogLevel>;

/// Level heuristics in priority order
pub const LEVEL_MATCHERS: &[(&str, LevelMatcher)] = &[
    ("bracketed-tag", match_bracketed_tag),
    ("timestamp-prefix", match_timestamp_prefix),
    ("error-content", match_error_content),
    ("platform-tag", match_platform_tag),
];

static BRACKETED_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[(debug|info|warn|warning|error|trace|exception)\]")
        .expect("Bracketed tag regex is valid")
});

static TIMESTAMP_LEVEL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\d{1,2}:\d{2}:\d{2}\.\d{3}\s+(DEBUG|INFO|WARN|WARNING|ERROR|TRACE)\s+")
        .expect("Timestamp level prefix regex is valid")
});

static ERROR_KEYWORD_COLON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)exception:|error:|failed:|failure:").expect("Error keyword regex is valid")
});

static ERROR_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(exception|error)\b").expect("Error word regex is valid"));

static EXCEPTION_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[exception\]").expect("Exception tag regex is valid"));

static STACK_FRAME_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\d+\s+").expect("Stack frame regex is valid"));

static PACKAGE_LOCATOR_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(package:[^)]+\)$").expect("Package locator regex is valid"));

static FRAME_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\d+\s+\S+\s+\(").expect("Frame shape regex is valid"));

static PLATFORM_TAG_LEVEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([VDIWEF])/[\w.-]+\s*\(").expect("Platform tag level regex is valid")
});

/// `[warn]`, `[EXCEPTION]`, ... anywhere in the message
pub fn match_bracketed_tag(subject: &LineSubject<'_>) -> Option<LogLevel> {
    let caps = BRACKETED_TAG.captures(subject.cleaned)?;
    caps[1].parse().ok()
}

/// `12:34:56.789 WARNING ...` at the start of the message
pub fn match_timestamp_prefix(subject: &LineSubject<'_>) -> Option<LogLevel> {
    let caps = TIMESTAMP_LEVEL_PREFIX.captures(subject.cleaned)?;
    caps[1].parse().ok()
}

/// Exceptions, failures and stack frames
pub fn match_error_content(subject: &LineSubject<'_>) -> Option<LogLevel> {
    let text = subject.cleaned;
    let trimmed = text.trim();
    let is_error = ERROR_KEYWORD_COLON.is_match(text)
        || (ERROR_WORD.is_match(text) && text.contains(':'))
        || EXCEPTION_TAG.is_match(text)
        || STACK_FRAME_START.is_match(trimmed)
        || PACKAGE_LOCATOR_END.is_match(trimmed)
        || FRAME_SHAPE.is_match(text);
    is_error.then_some(LogLevel::Error)
}

/// Single-letter platform level from an `E/tag(` prefix
pub fn match_platform_tag(subject: &LineSubject<'_>) -> Option<LogLevel> {
    let caps = PLATFORM_TAG_LEVEL
        .captures(subject.cleaned)
        .or_else(|| PLATFORM_TAG_LEVEL.captures(subject.uncleaned))?;
    match &caps[1] {
        "V" | "D" => Some(LogLevel::Debug),
        "I" => Some(LogLevel::Info),
        "W" => Some(LogLevel::Warn),
        "E" | "F" => Some(LogLevel::Error),
        _ => None,
    }
}

/// Level implied by the output category alone
pub fn level_for_category(category: &str) -> LogLevel {
    if category == STDERR_CATEGORY {
        LogLevel::Error
    } else {
        LogLevel::Info
    }
}

/// Run the matcher table, falling back to the category.
pub fn detect_level(subject: &LineSubject<'_>, category: &str) -> LogLevel {
    LEVEL_MATCHERS
        .iter()
        .find_map(|(_, matcher)| matcher(subject))
        .unwrap_or_else(|| level_for_category(category))
}

// ─────────────────────────────────────────────────────────────────
// Classification
// ─────────────────────────────────────────────────────────────────

const ID_SUFFIX_LEN: usize = 9;

/// `"{session}-{timestamp}-{9 base36 chars}"`
pub fn generate_record_id(session_id: &str, timestamp: i64) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .filter_map(|_| std::char::from_digit(rng.gen_range(0..36), 36))
        .collect();
    format!("{session_id}-{timestamp}-{suffix}")
}

/// Turn one raw output line into a record.
///
/// Returns `None` when the line is blank or nothing is left after cleaning.
pub fn classify(
    raw: &str,
    category: &str,
    session_id: &str,
    arrival_ms: i64,
    group: Option<GroupMarker>,
) -> Option<LogRecord> {
    if raw.trim().is_empty() {
        return None;
    }

    let message = clean_message(raw);
    if message.is_empty() {
        return None;
    }

    let uncleaned = if contains_ansi_codes(raw) {
        Cow::Owned(strip_ansi_codes(raw))
    } else {
        Cow::Borrowed(raw)
    };
    let subject = LineSubject {
        cleaned: &message,
        uncleaned: &uncleaned,
    };
    let level = detect_level(&subject, category);

    Some(LogRecord {
        id: generate_record_id(session_id, arrival_ms),
        timestamp: arrival_ms,
        level,
        message,
        category: category.to_string(),
        session_id: session_id.to_string(),
        group,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(text: &str) -> LineSubject<'_> {
        LineSubject {
            cleaned: text,
            uncleaned: text,
        }
    }

    fn level_of(raw: &str, category: &str) -> LogLevel {
        classify(raw, category, "s", 0, None)
            .expect("line should classify")
            .level
    }

    // ─────────────────────────────────────────────────────────
    // Cleaning
    // ─────────────────────────────────────────────────────────

    #[test]
    fn test_clean_strips_runtime_prefix_on_every_line() {
        assert_eq!(clean_message("flutter: hello"), "hello");
        assert_eq!(clean_message("flutter: a\nflutter: b"), "a\nb");
    }

    #[test]
    fn test_clean_strips_platform_tag_anywhere() {
        assert_eq!(clean_message("I/flutter (27893): ready"), "ready");
        assert_eq!(clean_message("x D/My.Tag-1( 42 ): y"), "x y");
    }

    #[test]
    fn test_clean_preserves_indentation_trims_trailing() {
        assert_eq!(clean_message("    indented  \t \n"), "    indented");
    }

    #[test]
    fn test_clean_strips_color_codes() {
        assert_eq!(clean_message("\x1b[31mred\x1b[0m"), "red");
        assert_eq!(clean_message("[38;5;75m│ info[0m"), "│ info");
    }

    // ─────────────────────────────────────────────────────────
    // Individual matchers
    // ─────────────────────────────────────────────────────────

    #[test]
    fn test_match_bracketed_tag_aliases() {
        assert_eq!(match_bracketed_tag(&subject("[EXCEPTION] x")), Some(LogLevel::Error));
        assert_eq!(match_bracketed_tag(&subject("a [Warning] b")), Some(LogLevel::Warn));
        assert_eq!(match_bracketed_tag(&subject("[trace] t")), Some(LogLevel::Debug));
        assert_eq!(match_bracketed_tag(&subject("[fatal] t")), None);
    }

    #[test]
    fn test_match_timestamp_prefix() {
        assert_eq!(
            match_timestamp_prefix(&subject("22:36:00.446 WARNING [APP] low")),
            Some(LogLevel::Warn)
        );
        assert_eq!(
            match_timestamp_prefix(&subject("1:02:03.004 debug tick")),
            Some(LogLevel::Debug)
        );
        assert_eq!(match_timestamp_prefix(&subject("at 22:36:00.446 INFO x")), None);
    }

    #[test]
    fn test_match_error_content_variants() {
        for line in [
            "FormatException: bad input",
            "request failed: timeout",
            "Unhandled error in zone: x",
            "#0      main (package:app/main.dart:10:5)",
            "   #12   State.build (file.dart:1)",
            "at widget (package:flutter/src/widgets.dart:1:2)",
        ] {
            assert_eq!(match_error_content(&subject(line)), Some(LogLevel::Error), "{line}");
        }
    }

    #[test]
    fn test_match_error_content_needs_colon_for_plain_word() {
        assert_eq!(match_error_content(&subject("no error here")), None);
        assert_eq!(match_error_content(&subject("errors are fine")), None);
    }

    #[test]
    fn test_match_platform_tag_letters() {
        assert_eq!(match_platform_tag(&subject("V/Tag(1)")), Some(LogLevel::Debug));
        assert_eq!(match_platform_tag(&subject("I/Tag(1)")), Some(LogLevel::Info));
        assert_eq!(match_platform_tag(&subject("W/Tag (1)")), Some(LogLevel::Warn));
        assert_eq!(match_platform_tag(&subject("F/Tag(1)")), Some(LogLevel::Error));
        assert_eq!(match_platform_tag(&subject("plain")), None);
    }

    #[test]
    fn test_matcher_table_order() {
        let names: Vec<_> = LEVEL_MATCHERS.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            ["bracketed-tag", "timestamp-prefix", "error-content", "platform-tag"]
        );
    }

    // ─────────────────────────────────────────────────────────
    // Full classification
    // ─────────────────────────────────────────────────────────

    #[test]
    fn test_tag_beats_error_content() {
        assert_eq!(level_of("[debug] error: x", "stdout"), LogLevel::Debug);
    }

    #[test]
    fn test_runtime_prefix_stdout_is_info() {
        let record = classify("flutter: hello", "stdout", "s1", 10, None).unwrap();
        assert_eq!(record.level, LogLevel::Info);
        assert_eq!(record.message, "hello");
    }

    #[test]
    fn test_platform_error_tag_survives_cleaning() {
        let record = classify("E/MyApp(1234): boom", "stdout", "s1", 10, None).unwrap();
        assert_eq!(record.level, LogLevel::Error);
        assert_eq!(record.message, "boom");
    }

    #[test]
    fn test_bracketed_warn_keeps_message() {
        let record = classify("[WARN] disk low", "console", "s1", 10, None).unwrap();
        assert_eq!(record.level, LogLevel::Warn);
        assert_eq!(record.message, "[WARN] disk low");
    }

    #[test]
    fn test_category_fallback() {
        assert_eq!(level_of("something", "stderr"), LogLevel::Error);
        assert_eq!(level_of("something", "console"), LogLevel::Info);
        assert_eq!(level_of("something", "important"), LogLevel::Info);
    }

    #[test]
    fn test_blank_lines_dropped() {
        assert!(classify("", "stdout", "s", 0, None).is_none());
        assert!(classify("   \n\t", "stdout", "s", 0, None).is_none());
        assert!(classify("\x1b[0m", "stdout", "s", 0, None).is_none());
        assert!(classify("flutter: ", "stdout", "s", 0, None).is_none());
    }

    #[test]
    fn test_record_fields() {
        let record = classify("hi", "stdout", "sess", 1234, Some(GroupMarker::Start)).unwrap();
        assert_eq!(record.session_id, "sess");
        assert_eq!(record.category, "stdout");
        assert_eq!(record.timestamp, 1234);
        assert_eq!(record.group, Some(GroupMarker::Start));
        assert!(record.id.starts_with("sess-1234-"));
    }

    #[test]
    fn test_generated_ids_are_base36_and_distinct() {
        let a = generate_record_id("s", 5);
        let b = generate_record_id("s", 5);
        let suffix = a.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), ID_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(a, b);
    }
}
