//! Filter bar handlers
//!
//! Every change here is an explicit filter edit, so the filtered view is
//! rebuilt from the whole store and the viewport repositions.

use dcplus_core::LogLevel;
use tracing::debug;

use crate::state::{AppState, UiMode};

use super::UpdateResult;

pub fn handle_toggle_level(state: &mut AppState, level: LogLevel) -> UpdateResult {
    state.update_filter(|s| s.toggle_level(level));
    UpdateResult::none()
}

pub fn handle_set_search(state: &mut AppState, text: String) -> UpdateResult {
    state.update_filter(|s| s.search_query = text);
    UpdateResult::none()
}

pub fn handle_start_search_input(state: &mut AppState) -> UpdateResult {
    state.ui_mode = UiMode::SearchInput;
    state.viewport.request_render(true);
    UpdateResult::none()
}

pub fn handle_exit_search_input(state: &mut AppState) -> UpdateResult {
    state.ui_mode = UiMode::Normal;
    state.viewport.request_render(true);
    UpdateResult::none()
}

pub fn handle_toggle_regex(state: &mut AppState) -> UpdateResult {
    state.update_filter(|s| s.use_regex = !s.use_regex);
    UpdateResult::none()
}

/// AND/OR only means something once there is a search query.
pub fn handle_toggle_combine_mode(state: &mut AppState) -> UpdateResult {
    let changed = state.update_filter(|s| {
        s.toggle_combine_mode();
    });
    if !changed {
        debug!("Combine mode unchanged: no search query");
    }
    UpdateResult::none()
}
