//! Filter bar: level toggles, search input, combine mode and counts

use dcplus_app::state::{AppState, UiMode};
use dcplus_core::{LogLevel, SearchMatcher};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::styles;

pub struct FilterBar<'a> {
    state: &'a AppState,
}

impl<'a> FilterBar<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn level_toggles(&self) -> Vec<Span<'static>> {
        let filter = self.state.filter.state();
        LogLevel::ALL
            .iter()
            .enumerate()
            .flat_map(|(i, &level)| {
                let label = format!("{} {}", i + 1, level.as_str().to_ascii_uppercase());
                let style = if filter.is_level_active(level) {
                    styles::level(level).0.add_modifier(Modifier::BOLD)
                } else {
                    styles::text_muted().add_modifier(Modifier::CROSSED_OUT)
                };
                [Span::styled(label, style), Span::raw(" ")]
            })
            .collect()
    }

    fn search(&self) -> Vec<Span<'static>> {
        let filter = self.state.filter.state();
        let editing = self.state.ui_mode == UiMode::SearchInput;
        let mut spans = vec![Span::styled("/", styles::accent_bold())];

        if filter.search_query.is_empty() && !editing {
            spans.push(Span::styled("search", styles::text_muted()));
        } else {
            let style = if editing {
                styles::text_primary()
            } else {
                styles::accent()
            };
            spans.push(Span::styled(filter.search_query.clone(), style));
        }
        if editing {
            spans.push(Span::styled("▏", styles::accent()));
        }

        if filter.use_regex {
            // A pattern that failed to compile searches as plain text
            let fell_back = filter.has_search()
                && matches!(
                    self.state.filter.predicate().search(),
                    SearchMatcher::Substring(_)
                );
            if fell_back {
                spans.push(Span::styled(" [.*!]", styles::status_red()));
            } else {
                spans.push(Span::styled(" [.*]", styles::accent()));
            }
        }

        if filter.has_search() {
            spans.push(Span::styled(
                format!(" {}", filter.combine_mode.symbol()),
                styles::text_secondary(),
            ));
        }
        spans
    }

    fn counts(&self) -> Span<'static> {
        Span::styled(
            format!("{}/{}", self.state.filter.len(), self.state.store.len()),
            styles::text_secondary(),
        )
    }
}

impl Widget for FilterBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let separator = || Span::styled("│ ", styles::text_muted());

        let mut spans = vec![Span::raw(" ")];
        spans.extend(self.level_toggles());
        spans.push(separator());
        spans.extend(self.search());
        spans.push(Span::raw(" "));
        spans.push(separator());
        spans.push(self.counts());

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_state, push_lines, TestTerminal};

    fn render(state: &AppState) -> TestTerminal {
        let mut term = TestTerminal::with_size(100, 1);
        let area = term.area();
        term.render_widget(FilterBar::new(state), area);
        term
    }

    #[test]
    fn test_shows_levels_and_counts() {
        let mut state = create_test_state(100, 24);
        push_lines(&mut state, ["[debug] a", "b", "c"]);
        let term = render(&state);
        assert!(term.buffer_contains("1 DEBUG"));
        assert!(term.buffer_contains("4 ERROR"));
        assert!(term.buffer_contains("/search"));
        assert!(term.buffer_contains("2/3"));
    }

    #[test]
    fn test_inactive_level_is_crossed_out() {
        let state = create_test_state(100, 24);
        let term = render(&state);
        // " 1 DEBUG": the "1" sits at x=1
        let cell = &term.buffer()[(1, 0)];
        assert!(cell.modifier.contains(Modifier::CROSSED_OUT));
    }

    #[test]
    fn test_search_input_shows_cursor_and_mode() {
        let mut state = create_test_state(100, 24);
        state.update_filter(|s| s.search_query = "net".into());
        state.ui_mode = UiMode::SearchInput;
        let term = render(&state);
        assert!(term.buffer_contains("/net▏"));
        assert!(term.buffer_contains("&&"));
    }

    #[test]
    fn test_invalid_regex_marked() {
        let mut state = create_test_state(100, 24);
        state.update_filter(|s| {
            s.use_regex = true;
            s.search_query = "(open".into();
        });
        let term = render(&state);
        assert!(term.buffer_contains("[.*!]"));
    }
}
