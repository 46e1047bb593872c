//! ANSI escape code handling utilities
//!
//! Debug adapters forward program output verbatim, so colored logger output
//! arrives as escape sequences. Some adapters go one step further and forward
//! the sequences with the ESC byte already dropped, which leaves literal
//! `[38;5;75m` fragments in the text. Both forms are removed here.

use regex::Regex;
use std::sync::LazyLock;

/// Regex pattern for real ANSI escape sequences.
///
/// Covers:
/// - CSI sequences: ESC [ ... letter (colors, cursor, etc.)
/// - OSC sequences: ESC ] ... BEL or ST (hyperlinks, titles)
/// - Simple escapes: ESC letter
/// - Caret notation: ^[ ... (ESC spelled out by the producing tool)
static ANSI_ESCAPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \x1b\[[0-9;?]*[A-Za-z]               # CSI sequences
        | \x1b\][^\x07\x1b]*(?:\x07|\x1b\\)  # OSC sequences
        | \x1b[A-Za-z]                       # Simple escapes
        | \^\[\[[0-9;?]*[A-Za-z]             # ^[[ CSI sequences
        ",
    )
    .expect("ANSI regex pattern is valid")
});

/// Regex pattern for SGR color codes whose ESC byte was lost in transit.
///
/// Only `m`-terminated numeric parameter lists are matched, so ordinary
/// bracketed text such as `[info]` or `[42]` survives.
static LITERAL_SGR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\d+(?:;\d+)*m").expect("Literal SGR regex pattern is valid")
});

/// Strip ANSI escape sequences and literal-encoded color codes from a string.
///
/// Preserves box-drawing characters, emoji, and all other visible text.
///
/// # Examples
///
/// ```
/// use dcplus_core::strip_ansi_codes;
///
/// assert_eq!(strip_ansi_codes("\x1b[31mred text\x1b[0m"), "red text");
/// assert_eq!(strip_ansi_codes("[38;5;75mblue[0m"), "blue");
/// assert_eq!(strip_ansi_codes("│ 🐛 Debug message"), "│ 🐛 Debug message");
/// ```
pub fn strip_ansi_codes(input: &str) -> String {
    let without_escapes = ANSI_ESCAPE_PATTERN.replace_all(input, "");
    LITERAL_SGR_PATTERN
        .replace_all(&without_escapes, "")
        .into_owned()
}

/// Check if a string contains ANSI escape sequences (real or literal-encoded).
///
/// ```
/// use dcplus_core::contains_ansi_codes;
///
/// assert!(contains_ansi_codes("\x1b[31mred\x1b[0m"));
/// assert!(!contains_ansi_codes("plain text"));
/// ```
pub fn contains_ansi_codes(input: &str) -> bool {
    ANSI_ESCAPE_PATTERN.is_match(input) || LITERAL_SGR_PATTERN.is_match(input)
}
