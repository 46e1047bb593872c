//! Screen layout definitions for the TUI

use ratatui::layout::{Constraint, Layout, Rect};

/// Screen areas for the main layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenAreas {
    /// Level toggles, search input and counts
    pub filter_bar: Rect,

    /// Bordered log list
    pub logs: Rect,

    pub status_bar: Rect,
}

/// Split the terminal into filter bar, log view and status bar
pub fn create(area: Rect) -> ScreenAreas {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .split(area);

    ScreenAreas {
        filter_bar: chunks[0],
        logs: chunks[1],
        status_bar: chunks[2],
    }
}

/// Where record rows are drawn inside the log block: inside the border,
/// minus one column reserved for the scrollbar.
pub fn log_content_area(logs: Rect) -> Rect {
    Rect::new(
        logs.x.saturating_add(1),
        logs.y.saturating_add(1),
        logs.width.saturating_sub(3),
        logs.height.saturating_sub(2),
    )
}

/// Viewport container size for a terminal of `width` x `height`
pub fn viewport_size(width: u16, height: u16) -> (u16, u16) {
    let content = log_content_area(create(Rect::new(0, 0, width, height)).logs);
    (content.width, content.height)
}
