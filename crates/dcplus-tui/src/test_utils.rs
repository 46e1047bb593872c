//! Test utilities for TUI rendering verification
//!
//! Helpers for testing widgets and full-screen rendering with ratatui's
//! TestBackend, plus a populated [`AppState`] that has already run a frame.

use dcplus_app::config::Settings;
use dcplus_app::{AppState, LogStore, RenderWindow};
use dcplus_core::{OutputEvent, TimestampMode};
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use ratatui::Frame;
use ratatui::Terminal;

use crate::layout;
use crate::measure::WrapMeasurer;

/// Standard test terminal size (matches common terminal dimensions)
pub const TEST_WIDTH: u16 = 80;
pub const TEST_HEIGHT: u16 = 24;

/// Thin wrapper around a TestBackend terminal
pub struct TestTerminal {
    pub terminal: Terminal<TestBackend>,
}

impl TestTerminal {
    /// Create a new test terminal with standard dimensions (80x24)
    pub fn new() -> Self {
        Self::with_size(TEST_WIDTH, TEST_HEIGHT)
    }

    pub fn with_size(width: u16, height: u16) -> Self {
        let backend = TestBackend::new(width, height);
        let terminal = Terminal::new(backend).expect("Failed to create test terminal");
        Self { terminal }
    }

    pub fn area(&self) -> Rect {
        let size = self.terminal.size().expect("Failed to get terminal size");
        Rect::new(0, 0, size.width, size.height)
    }

    pub fn render_widget<W: Widget>(&mut self, widget: W, area: Rect) {
        self.terminal
            .draw(|frame| frame.render_widget(widget, area))
            .expect("Failed to render widget");
    }

    /// Draw a full frame with a custom rendering function
    pub fn draw_with<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal.draw(f).expect("Failed to draw frame");
    }

    pub fn buffer(&self) -> &Buffer {
        self.terminal.backend().buffer()
    }

    /// Check if the buffer contains a string anywhere
    pub fn buffer_contains(&self, text: &str) -> bool {
        buffer_to_string(self.buffer()).contains(text)
    }

    /// Check if a specific line contains text
    pub fn line_contains(&self, line: u16, text: &str) -> bool {
        get_line_content(self.buffer(), line).contains(text)
    }

    pub fn line(&self, line: u16) -> String {
        get_line_content(self.buffer(), line)
    }

    /// Get all content as a string (for debugging)
    pub fn content(&self) -> String {
        buffer_to_string(self.buffer())
    }
}

impl Default for TestTerminal {
    fn default() -> Self {
        Self::new()
    }
}

fn buffer_to_string(buffer: &Buffer) -> String {
    let mut result = String::new();
    for y in 0..buffer.area.height {
        result.push_str(&get_line_content(buffer, y));
        result.push('\n');
    }
    result
}

fn get_line_content(buffer: &Buffer, line: u16) -> String {
    let mut result = String::new();
    if line < buffer.area.height {
        for x in 0..buffer.area.width {
            result.push_str(buffer[(x, line)].symbol());
        }
    }
    result
}

/// In-memory state sized for a `width` x `height` terminal, timestamps off
pub fn create_test_state(width: u16, height: u16) -> AppState {
    let settings = Settings::default();
    let store = LogStore::in_memory(settings.store.max_logs);
    let mut state = AppState::with_store("/tmp/dcplus-tui-test", settings, store);
    state.timestamp_mode = TimestampMode::Hidden;
    let (w, h) = layout::viewport_size(width, height);
    state.resize(w, h);
    state
}

/// Ingest each line as stdout output
pub fn push_lines<'a>(state: &mut AppState, lines: impl IntoIterator<Item = &'a str>) {
    for (i, line) in lines.into_iter().enumerate() {
        state.ingest(&OutputEvent::new(line, "stdout"), 1_000 + i as i64);
    }
}

/// Run the viewport frame the runner would, forcing a window out
pub fn frame(state: &mut AppState) -> RenderWindow {
    state.viewport.request_render(true);
    let measurer = WrapMeasurer::for_state(state);
    let view = state.filter.view(&state.store);
    state
        .viewport
        .frame(&view, &measurer, state.selection.is_some())
        .expect("forced frame renders")
}
