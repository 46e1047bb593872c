//! Key event handlers for different UI modes

use dcplus_core::LogLevel;

use crate::input_key::InputKey;
use crate::message::Message;
use crate::state::{AppState, UiMode};

/// Convert key events to messages based on current UI mode
pub fn handle_key(state: &AppState, key: InputKey) -> Option<Message> {
    match state.ui_mode {
        UiMode::SearchInput => handle_key_search_input(state, key),
        UiMode::Normal => handle_key_normal(state, key),
    }
}

/// Typing edits the query live; Enter keeps it, Esc too.
fn handle_key_search_input(state: &AppState, key: InputKey) -> Option<Message> {
    let query = &state.filter.state().search_query;
    match key {
        InputKey::Esc | InputKey::Enter => Some(Message::ExitSearchInput),

        InputKey::Backspace => {
            let mut text = query.clone();
            text.pop().map(|_| Message::SetSearch(text))
        }

        // Clear all input
        InputKey::CharCtrl('u') => Some(Message::SetSearch(String::new())),

        InputKey::CharCtrl('c') => Some(Message::Quit),

        InputKey::Char(c) => {
            let mut text = query.clone();
            text.push(c);
            Some(Message::SetSearch(text))
        }

        _ => None,
    }
}

fn handle_key_normal(state: &AppState, key: InputKey) -> Option<Message> {
    let selecting = state.selection.is_some();
    match key {
        InputKey::Char('q') | InputKey::CharCtrl('c') => Some(Message::Quit),

        // Level toggles
        InputKey::Char('1') => Some(Message::ToggleLevel(LogLevel::Debug)),
        InputKey::Char('2') => Some(Message::ToggleLevel(LogLevel::Info)),
        InputKey::Char('3') => Some(Message::ToggleLevel(LogLevel::Warn)),
        InputKey::Char('4') => Some(Message::ToggleLevel(LogLevel::Error)),

        // Search
        InputKey::Char('/') => Some(Message::StartSearchInput),
        InputKey::Char('r') => Some(Message::ToggleRegex),
        InputKey::Char('l') => Some(Message::ToggleCombineMode),

        // Store
        InputKey::Char('c') => Some(Message::ClearLogs),
        InputKey::Char('o') => Some(Message::RequestLoad),
        InputKey::Char('e') => Some(Message::RequestExport),
        InputKey::Char('s') => Some(Message::RequestSave),

        // Display
        InputKey::Char('t') => Some(Message::CycleTimestampMode),
        InputKey::Char('m') => Some(Message::ToggleCompact),
        InputKey::Char('g') => Some(Message::ToggleTagHighlight),

        // Selection
        InputKey::Char('v') => Some(Message::ToggleSelection),
        InputKey::Esc if selecting => Some(Message::ClearSelection),
        InputKey::Char('k') | InputKey::Up if selecting => Some(Message::SelectionUp),
        InputKey::Char('j') | InputKey::Down if selecting => Some(Message::SelectionDown),

        // Scrolling
        InputKey::Char('k') | InputKey::Up => Some(Message::ScrollUp),
        InputKey::Char('j') | InputKey::Down => Some(Message::ScrollDown),
        InputKey::PageUp => Some(Message::PageUp),
        InputKey::PageDown => Some(Message::PageDown),
        InputKey::Home => Some(Message::ScrollToTop),
        InputKey::End | InputKey::Char('G') => Some(Message::ScrollToBottom),

        _ => None,
    }
}
