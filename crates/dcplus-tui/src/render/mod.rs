//! Main render/view function (View in TEA pattern)


use dcplus_app::{AppState, RenderWindow};
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::Frame;

use crate::layout;
use crate::theme::palette;
use crate::widgets;

/// Render the complete UI for this frame's window.
///
/// Pure rendering: state is only read. The window comes from
/// `VirtualViewport::frame`, which the runner calls beforehand.
pub fn view(frame: &mut Frame, state: &AppState, window: &RenderWindow) {
    let area = frame.area();

    let bg_block = Block::default().style(Style::default().bg(palette::DEEPEST_BG));
    frame.render_widget(bg_block, area);

    let areas = layout::create(area);
    frame.render_widget(widgets::FilterBar::new(state), areas.filter_bar);
    frame.render_widget(widgets::LogView::new(state, window), areas.logs);
    frame.render_widget(widgets::StatusBar::new(state), areas.status_bar);
}
