//! Status bar widget
//!
//! Session state, scroll mode, display toggles and the last status message.

use dcplus_app::state::{AppState, StatusKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::styles;

/// Status bar widget showing application state
pub struct StatusBar<'a> {
    state: &'a AppState,
}

impl<'a> StatusBar<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn session_indicator(&self) -> Span<'static> {
        if self.state.input_closed {
            return Span::styled("■ Input closed", styles::status_yellow());
        }
        match self.state.session.current() {
            Some(id) => Span::styled(format!("● {}", id), styles::status_green()),
            None => Span::styled("○ No session", styles::text_muted()),
        }
    }

    fn scroll_indicator(&self) -> Span<'static> {
        if self.state.viewport.is_following() {
            Span::styled("⬇ Follow", styles::status_green())
        } else {
            Span::styled("⬆ Paused", styles::status_yellow())
        }
    }

    fn display_flags(&self) -> Span<'static> {
        let mut text = format!("ts:{}", self.state.effective_timestamp_mode().label());
        if self.state.compact {
            text.push_str(" compact");
        }
        if self.state.highlight_tags {
            text.push_str(" tags");
        }
        Span::styled(text, styles::text_secondary())
    }

    fn status_message(&self) -> Option<Span<'static>> {
        self.state.status.as_ref().map(|status| {
            let style = match status.kind {
                StatusKind::Info => styles::text_primary(),
                StatusKind::Error => styles::status_red(),
            };
            Span::styled(status.text.clone(), style)
        })
    }

    /// Build all segments with separators
    fn build_segments(&self) -> Vec<Span<'static>> {
        let separator = Span::styled(" │ ", styles::text_muted());

        let mut segments = vec![Span::raw(" "), self.session_indicator()];

        segments.push(separator.clone());
        segments.push(self.scroll_indicator());

        segments.push(separator.clone());
        segments.push(self.display_flags());

        if let Some(message) = self.status_message() {
            segments.push(separator);
            segments.push(message);
        }

        segments
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(Line::from(self.build_segments())).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_state, push_lines, TestTerminal};

    fn render(state: &AppState) -> TestTerminal {
        let mut term = TestTerminal::with_size(100, 1);
        let area = term.area();
        term.render_widget(StatusBar::new(state), area);
        term
    }

    #[test]
    fn test_no_session_and_follow() {
        let state = create_test_state(100, 24);
        let term = render(&state);
        assert!(term.buffer_contains("No session"));
        assert!(term.buffer_contains("Follow"));
        assert!(term.buffer_contains("ts:off"));
    }

    #[test]
    fn test_active_session_shows_id() {
        let mut state = create_test_state(100, 24);
        push_lines(&mut state, ["hello"]);
        let id = state.session.current().map(str::to_string).unwrap();
        let term = render(&state);
        assert!(term.buffer_contains(&id));
    }

    #[test]
    fn test_input_closed_wins_over_session() {
        let mut state = create_test_state(100, 24);
        push_lines(&mut state, ["hello"]);
        state.input_closed = true;
        let term = render(&state);
        assert!(term.buffer_contains("Input closed"));
    }

    #[test]
    fn test_status_message_and_flags() {
        let mut state = create_test_state(100, 24);
        state.compact = true;
        state.set_status(StatusKind::Error, "Load failed: denied");
        let term = render(&state);
        assert!(term.buffer_contains("compact"));
        assert!(term.buffer_contains("Load failed: denied"));
    }
}
