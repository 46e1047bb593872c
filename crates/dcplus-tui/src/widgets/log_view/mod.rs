//! Virtualized log view
//!
//! Draws only the records in the viewport's [`RenderWindow`]. Each record is
//! placed at its cumulative top minus the scroll offset and wrapped with
//! [`wrap_ranges`], the same routine the height measurer uses.


use std::ops::Range;

use dcplus_app::{AppState, RenderWindow};
use dcplus_core::{tag_ranges, LogLevel, LogRecord};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget,
    },
};

use crate::layout;
use crate::measure::{wrap_ranges, WrapMeasurer, LEVEL_COLUMN, TIMESTAMP_COLUMN};
use crate::theme::styles;

/// Log view widget over the current render window
pub struct LogView<'a> {
    state: &'a AppState,
    window: &'a RenderWindow,
}

impl<'a> LogView<'a> {
    pub fn new(state: &'a AppState, window: &'a RenderWindow) -> Self {
        Self { state, window }
    }

    /// Get icon for log level
    fn level_icon(level: LogLevel) -> &'static str {
        match level {
            LogLevel::Error => "✗",
            LogLevel::Warn => "⚠",
            LogLevel::Info => "•",
            LogLevel::Debug => "·",
        }
    }

    fn title(&self) -> String {
        match self.state.selection_range() {
            Some((start, end)) => format!(" Logs ({} selected) ", end - start + 1),
            None => " Logs ".to_string(),
        }
    }

    fn empty_message(&self) -> &'static str {
        if self.state.store.is_empty() {
            "Waiting for output..."
        } else {
            "No records match the current filters"
        }
    }

    /// Screen lines for one record, first row carrying the prefix columns
    fn record_lines(&self, record: &LogRecord, text_width: u16) -> Vec<Line<'static>> {
        let text = self.state.display_text(record);
        let (icon_style, message_style) = styles::level(record.level);
        let highlights = self.highlights(&text);
        let timestamp = self.state.timestamp_text(record);
        let indent = usize::from(LEVEL_COLUMN)
            + timestamp.as_ref().map_or(0, |_| usize::from(TIMESTAMP_COLUMN));

        wrap_ranges(&text, text_width)
            .into_iter()
            .enumerate()
            .map(|(row, segment)| {
                let mut spans = Vec::new();
                if row == 0 {
                    if let Some(ts) = &timestamp {
                        spans.push(Span::styled(
                            format!("{:<width$}", ts, width = usize::from(TIMESTAMP_COLUMN)),
                            styles::text_muted(),
                        ));
                    }
                    spans.push(Span::styled(
                        format!("{} ", Self::level_icon(record.level)),
                        icon_style,
                    ));
                } else {
                    spans.push(Span::raw(" ".repeat(indent)));
                }
                spans.extend(styled_segment(&text, segment, &highlights, message_style));
                Line::from(spans)
            })
            .collect()
    }

    /// Highlight ranges in display text; search matches win over tags
    fn highlights(&self, text: &str) -> Vec<(Range<usize>, Style)> {
        let mut ranges: Vec<(Range<usize>, Style)> = Vec::new();
        if self.state.highlight_tags {
            ranges.extend(
                tag_ranges(text)
                    .into_iter()
                    .map(|(s, e)| (s..e, styles::tag_highlight())),
            );
        }
        ranges.extend(
            self.state
                .filter
                .predicate()
                .search()
                .find_ranges(text)
                .into_iter()
                .map(|(s, e)| (s..e, styles::search_highlight())),
        );
        ranges
    }
}

/// Split `text[segment]` into spans at highlight boundaries
fn styled_segment(
    text: &str,
    segment: Range<usize>,
    highlights: &[(Range<usize>, Style)],
    base: Style,
) -> Vec<Span<'static>> {
    let mut cuts = vec![segment.start, segment.end];
    for (range, _) in highlights {
        for point in [range.start, range.end] {
            if segment.contains(&point) && text.is_char_boundary(point) {
                cuts.push(point);
            }
        }
    }
    cuts.sort_unstable();
    cuts.dedup();

    cuts.windows(2)
        .filter(|w| w[0] < w[1])
        .map(|w| {
            let style = highlights
                .iter()
                .filter(|(range, _)| range.start <= w[0] && w[1] <= range.end)
                .fold(base, |style, (_, patch)| style.patch(*patch));
            Span::styled(text[w[0]..w[1]].to_string(), style)
        })
        .collect()
}

impl Widget for LogView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.state.selection.is_some() {
            styles::border_active()
        } else {
            styles::border_inactive()
        };
        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let content = layout::log_content_area(area);
        if content.width == 0 || content.height == 0 {
            return;
        }

        let view = self.state.view();
        if view.is_empty() {
            let y = content.y + content.height / 2;
            Paragraph::new(self.empty_message())
                .style(styles::text_muted())
                .alignment(Alignment::Center)
                .render(Rect::new(content.x, y, content.width, 1), buf);
            return;
        }

        let measurer = WrapMeasurer::for_state(self.state);
        let text_width = measurer.text_width(content.width);
        let selection = self.state.selection_range();
        let scroll_top = self.window.scroll_top;
        let bottom = scroll_top + u64::from(content.height);

        for row in &self.window.rows {
            if row.top >= bottom || row.top + u64::from(row.height) <= scroll_top {
                continue;
            }
            let Some(record) = view.get(row.index) else {
                continue;
            };
            let selected = selection.is_some_and(|(s, e)| (s..=e).contains(&row.index));

            for (offset, line) in self.record_lines(record, text_width).into_iter().enumerate() {
                let line_top = row.top + offset as u64;
                if line_top < scroll_top || line_top >= bottom {
                    continue;
                }
                let y = content.y + (line_top - scroll_top) as u16;
                let line_area = Rect::new(content.x, y, content.width, 1);
                buf.set_line(content.x, y, &line, content.width);
                if selected {
                    buf.set_style(line_area, styles::selection());
                }
            }
        }

        let total = self.window.total_height;
        if total > u64::from(content.height) {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");
            let max_scroll = total - u64::from(content.height);
            let mut scrollbar_state = ScrollbarState::new(max_scroll as usize + 1)
                .position(scroll_top.min(max_scroll) as usize)
                .viewport_content_length(usize::from(content.height));
            scrollbar.render(inner, buf, &mut scrollbar_state);
        }
    }
}
