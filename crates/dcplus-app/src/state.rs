//! Application state (Model in TEA pattern)

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use dcplus_core::prelude::*;
use dcplus_core::{
    classify, compact_message, snapshot_path, FilterState, LogRecord, OutputEvent, TimestampMode,
    SNAPSHOT_DIR,
};

use crate::config::Settings;
use crate::filter_engine::{FilterChange, FilterEngine, FilteredView};
use crate::session::SessionTracker;
use crate::store::{LogStore, SnapshotScheduler};
use crate::viewport::VirtualViewport;

/// Current UI mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiMode {
    /// Log view with filter and status bars
    #[default]
    Normal,

    /// Keystrokes edit the search text
    SearchInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppPhase {
    #[default]
    Running,
    Quitting,
}

/// A contiguous range of filtered records, tracked by store sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: u64,
    pub cursor: u64,
}

impl Selection {
    fn at(seq: u64) -> Self {
        Self {
            anchor: seq,
            cursor: seq,
        }
    }
}

/// Severity of the status line message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

/// Complete application state
#[derive(Debug)]
pub struct AppState {
    pub workspace: PathBuf,
    pub settings: Settings,
    pub phase: AppPhase,
    pub ui_mode: UiMode,

    pub store: LogStore,
    pub filter: FilterEngine,
    pub viewport: VirtualViewport,
    pub session: SessionTracker,

    pub selection: Option<Selection>,
    pub timestamp_mode: TimestampMode,
    /// Arrival time of the session's first record; survives eviction
    time_origin: Option<i64>,
    pub compact: bool,
    pub highlight_tags: bool,

    /// Last user-facing outcome (load, export, errors)
    pub status: Option<StatusMessage>,
    pub input_closed: bool,
}

impl AppState {
    /// State for `workspace`, persisting to its snapshot when enabled.
    pub fn new(workspace: impl Into<PathBuf>, settings: Settings) -> Self {
        let workspace = workspace.into();
        let scheduler = if settings.store.persist {
            SnapshotScheduler::new(
                workspace_snapshot(&workspace),
                Duration::from_millis(settings.store.write_debounce_ms),
            )
        } else {
            SnapshotScheduler::disabled()
        };
        let store = LogStore::new(settings.store.max_logs, scheduler);
        Self::with_store(workspace, settings, store)
    }

    pub fn with_store(workspace: impl Into<PathBuf>, settings: Settings, store: LogStore) -> Self {
        let filter = FilterEngine::new(FilterState {
            active_levels: settings.filter.default_levels.iter().copied().collect(),
            search_query: String::new(),
            use_regex: settings.filter.use_regex,
            combine_mode: settings.filter.combine_mode,
        });
        let viewport =
            VirtualViewport::new(settings.ui.buffer_rows, settings.ui.follow_threshold);

        Self {
            workspace: workspace.into(),
            phase: AppPhase::Running,
            ui_mode: UiMode::Normal,
            store,
            filter,
            viewport,
            session: SessionTracker::new(),
            selection: None,
            timestamp_mode: settings.ui.timestamp_mode,
            time_origin: None,
            compact: settings.ui.compact,
            highlight_tags: settings.ui.highlight_tags,
            status: None,
            input_closed: false,
            settings,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.phase == AppPhase::Quitting
    }

    pub fn request_quit(&mut self) {
        self.phase = AppPhase::Quitting;
    }

    pub fn view(&self) -> FilteredView<'_> {
        self.filter.view(&self.store)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        workspace_snapshot(&self.workspace)
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind,
            text: text.into(),
        });
    }

    // ─────────────────────────────────────────────────────────
    // Ingest Pipeline
    // ─────────────────────────────────────────────────────────

    /// Classify and append one output event, then bring the filtered view
    /// and viewport up to date. Returns whether a record was stored.
    pub fn ingest(&mut self, event: &OutputEvent, now_ms: i64) -> bool {
        let (session_id, _) = self.session.ensure(now_ms);
        let Some(record) = classify(
            &event.output,
            &event.category,
            &session_id,
            now_ms,
            event.group,
        ) else {
            trace!("Dropped empty output on {}", event.category);
            return false;
        };

        self.time_origin.get_or_insert(record.timestamp);
        let outcome = self.store.append(record);
        self.viewport.forget(&outcome.evicted);
        self.sync_view();
        true
    }

    /// New debug session: the store starts over.
    pub fn start_session(&mut self, now_ms: i64) {
        self.session.start(now_ms);
        self.time_origin = None;
        let removed = self.store.reset();
        self.after_wholesale_change(removed);
    }

    pub fn end_session(&mut self) {
        self.session.end();
    }

    /// User clear, written through to the snapshot.
    pub fn clear_logs(&mut self) {
        let removed = self.store.clear();
        self.time_origin = None;
        info!("Cleared {} records", removed.len());
        self.after_wholesale_change(removed);
    }

    /// Bulk load already-validated records.
    pub fn replace_records(&mut self, records: Vec<LogRecord>) {
        let removed = self.store.replace(records);
        self.time_origin = self.store.first().map(|r| r.timestamp);
        self.after_wholesale_change(removed);
    }

    fn after_wholesale_change(&mut self, removed: Vec<String>) {
        self.viewport.forget(&removed);
        self.selection = None;
        self.sync_view();
    }

    /// Incrementally sync the filter, then the viewport.
    pub fn sync_view(&mut self) {
        let change = self.filter.sync(&self.store);
        self.apply_filter_change(change);
    }

    /// Apply a filter edit; a no-op edit changes nothing.
    pub fn update_filter(&mut self, edit: impl FnOnce(&mut FilterState)) -> bool {
        match self.filter.update_state(&self.store, edit) {
            Some(change) => {
                self.apply_filter_change(change);
                true
            }
            None => false,
        }
    }

    fn apply_filter_change(&mut self, change: FilterChange) {
        if change.is_noop() {
            return;
        }
        self.viewport
            .apply_change(change, &self.filter.view(&self.store));
        self.retain_selection();
    }

    /// Drop the selection once either end leaves the filtered view.
    fn retain_selection(&mut self) {
        if let Some(sel) = self.selection {
            let alive = self.filter.index_of_seq(sel.anchor).is_some()
                && self.filter.index_of_seq(sel.cursor).is_some();
            if !alive {
                debug!("Selection left the filtered view");
                self.selection = None;
                self.viewport.request_render(true);
            }
        }
    }

    // ─────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────

    pub fn poll_persist(&mut self, now: Instant) {
        self.store.poll_persist(now);
    }

    /// Final write on shutdown
    pub fn flush(&mut self) {
        if let Err(e) = self.store.flush() {
            error!("Final snapshot write failed: {}", e);
        }
    }

    // ─────────────────────────────────────────────────────────
    // Viewport
    // ─────────────────────────────────────────────────────────

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport
            .resize(width, height, &self.filter.view(&self.store));
    }

    /// Display settings changed the measured text.
    pub fn invalidate_heights(&mut self) {
        self.viewport
            .invalidate_heights(&self.filter.view(&self.store));
    }

    // ─────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────

    /// Filtered index range `[start, end]` of the selection
    pub fn selection_range(&self) -> Option<(usize, usize)> {
        let sel = self.selection?;
        let a = self.filter.index_of_seq(sel.anchor)?;
        let c = self.filter.index_of_seq(sel.cursor)?;
        Some((a.min(c), a.max(c)))
    }

    pub fn selection_cursor(&self) -> Option<usize> {
        self.filter.index_of_seq(self.selection?.cursor)
    }

    /// Start at the last record on screen, or stop selecting.
    pub fn toggle_selection(&mut self) {
        if self.selection.take().is_none() {
            let (_, end) = self.viewport.visible_range();
            let last_on_screen = self
                .viewport
                .first_visible()
                .map(|first| {
                    let rows = u64::from(self.viewport.container_height());
                    let bottom = self.viewport.scroll_top() + rows.saturating_sub(1);
                    (first..end)
                        .take_while(|&i| self.viewport.positions().top(i) <= bottom)
                        .last()
                        .unwrap_or(first)
                });
            self.selection = last_on_screen
                .and_then(|i| self.filter.seq_at(i))
                .map(Selection::at);
        }
        self.viewport.request_render(true);
    }

    /// Move the cursor by `delta` filtered records, keeping it on screen.
    pub fn move_selection(&mut self, delta: isize) {
        let Some(cursor) = self.selection_cursor() else {
            return;
        };
        let last = self.filter.len().saturating_sub(1);
        let target = cursor.saturating_add_signed(delta).min(last);
        if let (Some(sel), Some(seq)) = (self.selection.as_mut(), self.filter.seq_at(target)) {
            sel.cursor = seq;
        }
        self.viewport.reveal(target);
        self.viewport.request_render(true);
    }

    pub fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            self.viewport.request_render(true);
        }
    }

    // ─────────────────────────────────────────────────────────
    // Display
    // ─────────────────────────────────────────────────────────

    /// Timestamp mode after auto-hiding on narrow views
    pub fn effective_timestamp_mode(&self) -> TimestampMode {
        let width = self.viewport.container_width();
        if width > 0 && width < self.settings.ui.auto_hide_timestamps_width {
            TimestampMode::Hidden
        } else {
            self.timestamp_mode
        }
    }

    /// Origin for relative timestamps
    pub fn first_timestamp(&self) -> Option<i64> {
        self.time_origin
    }

    /// Text shown for a record in the current display mode
    pub fn display_text<'a>(&self, record: &'a LogRecord) -> Cow<'a, str> {
        if self.compact {
            Cow::Owned(compact_message(&record.message))
        } else {
            Cow::Borrowed(&record.message)
        }
    }

    /// Timestamp column text for a record in the current mode
    pub fn timestamp_text(&self, record: &LogRecord) -> Option<String> {
        match self.effective_timestamp_mode() {
            TimestampMode::Absolute => Some(record.formatted_time()),
            TimestampMode::Relative => {
                let origin = self.first_timestamp().unwrap_or(record.timestamp);
                Some(record.formatted_relative(origin))
            }
            TimestampMode::Hidden => None,
        }
    }

    // ─────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────

    /// Lines for the selection, or the whole filtered view without one
    pub fn export_lines(&self) -> Vec<String> {
        let with_time = self.effective_timestamp_mode() != TimestampMode::Hidden;
        let view = self.view();
        match self.selection_range() {
            Some((start, end)) => view
                .range(start, end + 1)
                .map(|r| r.export_line(with_time))
                .collect(),
            None => view.iter().map(|r| r.export_line(with_time)).collect(),
        }
    }

    pub fn export_path(&self) -> PathBuf {
        export_path(&self.workspace, chrono::Local::now())
    }

    pub fn save_path(&self) -> PathBuf {
        save_path(&self.workspace, chrono::Local::now())
    }
}

/// `<workspace>/.dcplus/logs.json`
pub fn workspace_snapshot(workspace: &Path) -> PathBuf {
    snapshot_path(&workspace.join(SNAPSHOT_DIR))
}

/// `<workspace>/.dcplus/export-YYYYmmdd-HHMMSS.txt`
pub fn export_path(workspace: &Path, now: chrono::DateTime<chrono::Local>) -> PathBuf {
    workspace
        .join(SNAPSHOT_DIR)
        .join(format!("export-{}.txt", now.format("%Y%m%d-%H%M%S")))
}

/// `<workspace>/.dcplus/saved-YYYYmmdd-HHMMSS.json`
pub fn save_path(workspace: &Path, now: chrono::DateTime<chrono::Local>) -> PathBuf {
    workspace
        .join(SNAPSHOT_DIR)
        .join(format!("saved-{}.json", now.format("%Y%m%d-%H%M%S")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcplus_core::{CombineMode, LogLevel};

    fn state() -> AppState {
        let settings = Settings::default();
        let store = LogStore::in_memory(settings.store.max_logs);
        let mut state = AppState::with_store("/tmp/ws", settings, store);
        state.resize(100, 10);
        state
    }

    fn push(state: &mut AppState, text: &str) {
        state.ingest(&OutputEvent::new(text, "stdout"), 1_700_000_000_000);
    }

    #[test]
    fn test_ingest_classifies_and_filters() {
        let mut state = state();
        push(&mut state, "flutter: hello");
        push(&mut state, "[debug] noisy");
        push(&mut state, "E/MyApp(1234): boom");

        assert_eq!(state.store.len(), 3);
        // Debug is off by default
        let shown: Vec<_> = state.view().iter().map(|r| r.message.clone()).collect();
        assert_eq!(shown, vec!["hello", "boom"]);
        assert_eq!(state.view().get(1).unwrap().level, LogLevel::Error);
        assert_eq!(state.viewport.len(), 2);
    }

    #[test]
    fn test_blank_output_is_dropped() {
        let mut state = state();
        assert!(!state.ingest(&OutputEvent::new("   \n", "stdout"), 0));
        assert!(state.store.is_empty());
    }

    #[test]
    fn test_output_without_session_starts_one() {
        let mut state = state();
        push(&mut state, "hello");
        assert!(state.session.is_active());
        let sid = state.session.current().unwrap().to_string();
        assert_eq!(state.store.get(0).unwrap().session_id, sid);
    }

    #[test]
    fn test_new_session_clears_store() {
        let mut state = state();
        push(&mut state, "old");
        state.start_session(1);
        assert!(state.store.is_empty());
        assert!(state.viewport.is_empty());
        push(&mut state, "new");
        assert_eq!(state.view().len(), 1);
    }

    #[test]
    fn test_update_filter_reports_noop() {
        let mut state = state();
        assert!(!state.update_filter(|s| s.combine_mode = CombineMode::And));
        assert!(state.update_filter(|s| s.toggle_level(LogLevel::Debug)));
    }

    #[test]
    fn test_selection_follows_seq_through_appends() {
        let mut state = state();
        for i in 0..5 {
            push(&mut state, &format!("line {i}"));
        }
        state.toggle_selection();
        assert_eq!(state.selection_range(), Some((4, 4)));

        state.move_selection(-2);
        assert_eq!(state.selection_range(), Some((2, 4)));

        push(&mut state, "line 5");
        assert_eq!(state.selection_range(), Some((2, 4)));
        assert_eq!(state.export_lines().len(), 3);

        state.toggle_selection();
        assert!(state.selection.is_none());
        assert_eq!(state.export_lines().len(), 6);
    }

    #[test]
    fn test_selection_dropped_when_filtered_out() {
        let mut state = state();
        push(&mut state, "keep");
        push(&mut state, "error: boom");
        state.toggle_selection();
        assert!(state.selection.is_some());
        state.update_filter(|s| s.toggle_level(LogLevel::Error));
        assert!(state.selection.is_none());
    }

    #[test]
    fn test_timestamps_auto_hide_on_narrow_view() {
        let mut state = state();
        assert_eq!(state.effective_timestamp_mode(), TimestampMode::Absolute);
        state.resize(40, 10);
        assert_eq!(state.effective_timestamp_mode(), TimestampMode::Hidden);
    }

    #[test]
    fn test_export_lines_without_timestamps() {
        let mut state = state();
        state.timestamp_mode = TimestampMode::Hidden;
        push(&mut state, "[WARN] disk low");
        assert_eq!(state.export_lines(), vec!["[WARN] disk low"]);
    }

    #[test]
    fn test_export_path_format() {
        use chrono::TimeZone;
        let now = chrono::Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let path = export_path(Path::new("/ws"), now);
        assert_eq!(path, PathBuf::from("/ws/.dcplus/export-20240309-140507.txt"));
    }

    #[test]
    fn test_relative_origin_survives_eviction() {
        let settings = Settings::default();
        let mut state = AppState::with_store("/tmp/ws", settings, LogStore::in_memory(2));
        state.resize(100, 10);
        state.timestamp_mode = TimestampMode::Relative;
        for (i, ms) in [1_000, 2_000, 3_500].into_iter().enumerate() {
            state.ingest(&OutputEvent::new(format!("line {i}"), "stdout"), ms);
        }
        assert_eq!(state.store.first().unwrap().timestamp, 2_000);
        assert_eq!(state.first_timestamp(), Some(1_000));

        let newest = state.store.get(1).unwrap().clone();
        assert_eq!(state.timestamp_text(&newest).unwrap(), "+00:02.500");

        state.start_session(4_000);
        assert_eq!(state.first_timestamp(), None);
        state.ingest(&OutputEvent::new("fresh", "stdout"), 4_200);
        assert_eq!(state.first_timestamp(), Some(4_200));
    }

    #[test]
    fn test_compact_display_text() {
        let mut state = state();
        push(&mut state, "\u{2502} boxed");
        let record = state.store.get(0).unwrap().clone();
        state.compact = true;
        assert_eq!(state.display_text(&record), "boxed");
    }
}
