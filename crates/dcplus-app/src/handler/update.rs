//! Main update function - handles state transitions (TEA pattern)

use std::time::Instant;

use dcplus_core::InboundEvent;
use tracing::info;

use crate::message::Message;
use crate::state::{AppState, StatusKind};

use super::{filter, keys::handle_key, scroll, store, UpdateResult};

/// Milliseconds since the Unix epoch
fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Process a message and update state
/// Returns optional follow-up message and/or action
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::Quit => {
            state.request_quit();
            UpdateResult::none()
        }

        Message::Key(key) => {
            if let Some(msg) = handle_key(state, key) {
                UpdateResult::message(msg)
            } else {
                UpdateResult::none()
            }
        }

        Message::Resize { width, height } => {
            state.resize(width, height);
            // The terminal repaints from scratch after a resize
            state.viewport.request_render(true);
            UpdateResult::none()
        }

        Message::Tick => {
            state.poll_persist(Instant::now());
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Protocol Input
        // ─────────────────────────────────────────────────────────
        Message::Inbound(InboundEvent::Output(event)) => {
            state.ingest(&event, now_ms());
            UpdateResult::none()
        }

        Message::Inbound(InboundEvent::SessionStarted) => {
            state.start_session(now_ms());
            UpdateResult::none()
        }

        Message::Inbound(InboundEvent::SessionEnded) => {
            state.end_session();
            UpdateResult::none()
        }

        Message::InputClosed => {
            info!("Input stream closed");
            state.input_closed = true;
            state.set_status(StatusKind::Info, "Input closed");
            state.viewport.request_render(true);
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Filter Messages
        // ─────────────────────────────────────────────────────────
        Message::ToggleLevel(level) => filter::handle_toggle_level(state, level),
        Message::SetSearch(text) => filter::handle_set_search(state, text),
        Message::StartSearchInput => filter::handle_start_search_input(state),
        Message::ExitSearchInput => filter::handle_exit_search_input(state),
        Message::ToggleRegex => filter::handle_toggle_regex(state),
        Message::ToggleCombineMode => filter::handle_toggle_combine_mode(state),

        // ─────────────────────────────────────────────────────────
        // Store Messages
        // ─────────────────────────────────────────────────────────
        Message::ClearLogs => store::handle_clear(state),
        Message::RequestLoad => store::handle_request_load(state),
        Message::LoadEntries(entries) => store::handle_load_entries(state, entries),
        Message::RequestExport => store::handle_request_export(state),
        Message::Exported { path, lines } => store::handle_exported(state, path, lines),
        Message::RequestSave => store::handle_request_save(state),
        Message::Saved { path, records } => store::handle_saved(state, path, records),
        Message::ActionFailed(reason) => {
            state.set_status(StatusKind::Error, reason);
            state.viewport.request_render(true);
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Scroll Messages
        // ─────────────────────────────────────────────────────────
        Message::ScrollUp => scroll::handle_scroll_by(state, -1),
        Message::ScrollDown => scroll::handle_scroll_by(state, 1),
        Message::ScrollBy(delta) => scroll::handle_scroll_by(state, delta),
        Message::PageUp => scroll::handle_page_up(state),
        Message::PageDown => scroll::handle_page_down(state),
        Message::ScrollToTop => scroll::handle_scroll_to_top(state),
        Message::ScrollToBottom => scroll::handle_scroll_to_bottom(state),

        // ─────────────────────────────────────────────────────────
        // Selection Messages
        // ─────────────────────────────────────────────────────────
        Message::ToggleSelection => {
            state.toggle_selection();
            UpdateResult::none()
        }
        Message::SelectionUp => {
            state.move_selection(-1);
            UpdateResult::none()
        }
        Message::SelectionDown => {
            state.move_selection(1);
            UpdateResult::none()
        }
        Message::ClearSelection => {
            state.clear_selection();
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Display Messages
        // ─────────────────────────────────────────────────────────
        Message::CycleTimestampMode => {
            state.timestamp_mode = state.timestamp_mode.next();
            state.invalidate_heights();
            UpdateResult::none()
        }
        Message::ToggleCompact => {
            state.compact = !state.compact;
            state.invalidate_heights();
            UpdateResult::none()
        }
        Message::ToggleTagHighlight => {
            state.highlight_tags = !state.highlight_tags;
            state.viewport.request_render(true);
            UpdateResult::none()
        }
    }
}
