//! Semantic style builders

use dcplus_core::LogLevel;
use ratatui::style::{Modifier, Style};

use super::palette;

// --- Text styles ---
pub fn text_primary() -> Style {
    Style::default().fg(palette::TEXT_PRIMARY)
}

pub fn text_secondary() -> Style {
    Style::default().fg(palette::TEXT_SECONDARY)
}

pub fn text_muted() -> Style {
    Style::default().fg(palette::TEXT_MUTED)
}

// --- Border styles ---
pub fn border_inactive() -> Style {
    Style::default().fg(palette::BORDER_DIM)
}

pub fn border_active() -> Style {
    Style::default().fg(palette::BORDER_ACTIVE)
}

// --- Accent styles ---
pub fn accent() -> Style {
    Style::default().fg(palette::ACCENT)
}

pub fn accent_bold() -> Style {
    Style::default()
        .fg(palette::ACCENT)
        .add_modifier(Modifier::BOLD)
}

// --- Status styles ---
pub fn status_green() -> Style {
    Style::default().fg(palette::STATUS_GREEN)
}

pub fn status_red() -> Style {
    Style::default().fg(palette::STATUS_RED)
}

pub fn status_yellow() -> Style {
    Style::default().fg(palette::STATUS_YELLOW)
}

// --- Log rows ---

/// `(icon_style, message_style)` for a level
pub fn level(level: LogLevel) -> (Style, Style) {
    match level {
        LogLevel::Error => (
            Style::default()
                .fg(palette::LOG_ERROR)
                .add_modifier(Modifier::BOLD),
            Style::default().fg(palette::LOG_ERROR_MSG),
        ),
        LogLevel::Warn => (
            Style::default()
                .fg(palette::LOG_WARNING)
                .add_modifier(Modifier::BOLD),
            Style::default().fg(palette::LOG_WARNING_MSG),
        ),
        LogLevel::Info => (
            Style::default().fg(palette::LOG_INFO),
            Style::default().fg(palette::LOG_INFO_MSG),
        ),
        LogLevel::Debug => (
            Style::default().fg(palette::LOG_DEBUG),
            Style::default().fg(palette::LOG_DEBUG_MSG),
        ),
    }
}

pub fn search_highlight() -> Style {
    Style::default()
        .fg(palette::SEARCH_HIGHLIGHT_FG)
        .bg(palette::SEARCH_HIGHLIGHT_BG)
}

pub fn tag_highlight() -> Style {
    Style::default()
        .fg(palette::TAG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn selection() -> Style {
    Style::default().bg(palette::SELECTION_BG)
}
