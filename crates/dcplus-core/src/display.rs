//! Display-only text transforms
//!
//! None of these touch the stored record; they shape what a row shows.

use regex::Regex;
use std::sync::LazyLock;

/// Verbose logger prefixes: `[APP] | 12:00:01 15ms | `, `12:00:01.123 INFO `,
/// and `D/sqflite: `.
static VERBOSE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\[\w+\]\s*\|\s*\d{1,2}:\d{2}:\d{2}\s+\d+ms\s*\|\s*|\d{2}:\d{2}:\d{2}\.\d{3}\s+(?:DEBUG|INFO|WARNING|ERROR|WARN)\s+|[DIWEV]/[\w.]+:\s*)",
    )
    .expect("Verbose prefix regex is valid")
});

/// `[2026-02-07 18:06:00.904]` anywhere in the line
static BRACKETED_DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?\]\s*")
        .expect("Bracketed datetime regex is valid")
});

static BOX_DRAWING_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[│├└┌┐┘┴┬┼─║╔╗╚╝╠╣╦╩╬]+\s*").expect("Box drawing regex is valid")
});

static BRACKETED_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([A-Za-z][\w. =-]*)\]").expect("Tag highlight regex is valid")
});

const LEVEL_WORDS: [&str; 7] = ["debug", "info", "warn", "warning", "error", "trace", "exception"];

/// Strip logger decoration for compact display.
pub fn compact_message(message: &str) -> String {
    let text = VERBOSE_PREFIX.replace(message, "");
    let text = BRACKETED_DATETIME.replace_all(&text, "");
    BOX_DRAWING_RUN.replace_all(&text, "").into_owned()
}

/// Byte ranges of `[Tag]` spans worth highlighting. Level tags are skipped,
/// they already color the whole row.
pub fn tag_ranges(text: &str) -> Vec<(usize, usize)> {
    BRACKETED_TAG
        .captures_iter(text)
        .filter(|caps| !LEVEL_WORDS.contains(&caps[1].to_ascii_lowercase().as_str()))
        .filter_map(|caps| caps.get(0).map(|m| (m.start(), m.end())))
        .collect()
}
