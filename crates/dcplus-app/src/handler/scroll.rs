//! Scroll message handlers

use crate::state::AppState;

use super::UpdateResult;

pub fn handle_scroll_by(state: &mut AppState, delta: i64) -> UpdateResult {
    state.viewport.scroll_by(delta);
    UpdateResult::none()
}

pub fn handle_page_up(state: &mut AppState) -> UpdateResult {
    state.viewport.page_up();
    UpdateResult::none()
}

pub fn handle_page_down(state: &mut AppState) -> UpdateResult {
    state.viewport.page_down();
    UpdateResult::none()
}

pub fn handle_scroll_to_top(state: &mut AppState) -> UpdateResult {
    state.viewport.scroll_to_top();
    UpdateResult::none()
}

/// Jumping to the end resumes auto-follow
pub fn handle_scroll_to_bottom(state: &mut AppState) -> UpdateResult {
    state.viewport.scroll_to_bottom();
    UpdateResult::none()
}
