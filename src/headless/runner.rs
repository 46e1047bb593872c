//! Headless mode runner - main event loop without TUI

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use dcplus_app::state::{AppState, StatusKind};
use dcplus_app::{message::Message, Engine, InputSource};
use dcplus_core::prelude::*;
use dcplus_core::InboundEvent;

use super::HeadlessEvent;

/// How long to wait for a message before giving the snapshot writer a turn
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Run in headless mode - output JSON events instead of TUI
pub async fn run_headless(
    workspace: &Path,
    input: InputSource,
    load: Option<PathBuf>,
) -> Result<()> {
    dcplus_core::logging::init()?;

    info!("═══════════════════════════════════════════════════════");
    info!("Debug Console Plus starting in HEADLESS mode");
    info!("Workspace: {}", workspace.display());
    info!("═══════════════════════════════════════════════════════");

    let mut engine = Engine::new(workspace.to_path_buf());
    let mut cursor = EmitCursor::default();
    if let Some(path) = load {
        engine.load_file(path);
        report_load(&engine.state, &mut cursor);
    }
    engine.spawn_input(input);

    let result = headless_event_loop(&mut engine, cursor).await;

    engine.shutdown();

    info!("Debug Console Plus headless mode exiting");
    result
}

/// What the emitter has already reported
#[derive(Debug, Default)]
struct EmitCursor {
    /// Store sequence number of the next record to print
    next_seq: u64,
    session: Option<String>,
    sessions_started: u64,
}

/// Print loaded records, or the reason nothing was loaded
fn report_load(state: &AppState, cursor: &mut EmitCursor) {
    match &state.status {
        Some(status) if status.kind == StatusKind::Error => {
            HeadlessEvent::error(status.text.clone(), false).emit();
        }
        _ => emit_records(state, cursor, true),
    }
}

async fn headless_event_loop(engine: &mut Engine, mut cursor: EmitCursor) -> Result<()> {
    loop {
        if engine.should_quit() {
            info!("Quit requested");
            break;
        }

        // Wake in time for a pending snapshot write
        let wait = engine
            .state
            .store
            .time_until_persist(Instant::now())
            .map_or(IDLE_POLL, |d| d.min(IDLE_POLL));

        match tokio::time::timeout(wait, engine.msg_rx.recv()).await {
            Ok(Some(msg)) => {
                match msg {
                    Message::ActionFailed(ref text) => {
                        HeadlessEvent::error(text.clone(), false).emit();
                    }
                    // The store is about to be cleared; print what is held back
                    Message::Inbound(InboundEvent::SessionStarted) => {
                        emit_records(&engine.state, &mut cursor, true);
                    }
                    _ => {}
                }
                engine.process_message(msg);
                emit_post_message_events(&engine.state, &mut cursor);

                if engine.state.input_closed {
                    emit_records(&engine.state, &mut cursor, true);
                    HeadlessEvent::input_closed(engine.state.store.len()).emit();
                    break;
                }
            }
            Ok(None) => {
                warn!("Message channel closed");
                break;
            }
            Err(_) => {}
        }
        engine.poll_persist();
    }

    Ok(())
}

/// Emit session transitions and every settled record stored since the last call
fn emit_post_message_events(state: &AppState, cursor: &mut EmitCursor) {
    let current = state.session.current();
    let started = state.session.started();

    if started != cursor.sessions_started {
        if let Some(previous) = cursor.session.as_deref().filter(|p| Some(*p) != current) {
            HeadlessEvent::session_ended(previous).emit();
        }
        if let Some(id) = current {
            HeadlessEvent::session_started(id).emit();
        }
    } else if let (Some(previous), None) = (cursor.session.as_deref(), current) {
        HeadlessEvent::session_ended(previous).emit();
    }
    cursor.sessions_started = started;
    cursor.session = current.map(str::to_string);

    emit_records(state, cursor, current.is_none());
}

/// Print records the cursor has not reached yet.
///
/// Trailing group start lines wait until a content line settles their
/// level, unless `settle_all` is set because nothing else will arrive.
fn emit_records(state: &AppState, cursor: &mut EmitCursor, settle_all: bool) {
    let until = if settle_all {
        state.store.next_seq()
    } else {
        state.store.unsettled_seq()
    };
    for (seq, record) in state.store.iter_from_seq(cursor.next_seq) {
        if seq >= until {
            break;
        }
        HeadlessEvent::log(record).emit();
    }
    cursor.next_seq = cursor.next_seq.max(until);
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcplus_app::config::Settings;
    use dcplus_core::{GroupMarker, LogLevel, OutputEvent};
    use std::path::PathBuf;

    fn engine() -> Engine {
        let mut settings = Settings::default();
        settings.store.persist = false;
        Engine::with_settings(PathBuf::from("/tmp/dcplus-headless"), settings)
    }

    #[tokio::test]
    async fn test_loop_stops_when_input_closes() {
        let mut engine = engine();
        let tx = engine.msg_sender();
        tx.send(Message::Inbound(InboundEvent::Output(OutputEvent::new(
            "hello", "stdout",
        ))))
        .await
        .unwrap();
        tx.send(Message::InputClosed).await.unwrap();

        headless_event_loop(&mut engine, EmitCursor::default())
            .await
            .unwrap();
        assert_eq!(engine.state.store.len(), 1);
        assert!(engine.state.input_closed);
    }

    #[test]
    fn test_cursor_advances_past_emitted_records() {
        let mut engine = engine();
        let mut cursor = EmitCursor::default();
        engine
            .state
            .ingest(&OutputEvent::new("one", "stdout"), 1_000);
        emit_post_message_events(&engine.state, &mut cursor);
        assert_eq!(cursor.next_seq, 1);
        assert_eq!(cursor.sessions_started, 1);
        assert!(cursor.session.is_some());

        engine.state.end_session();
        emit_post_message_events(&engine.state, &mut cursor);
        assert!(cursor.session.is_none());
        assert_eq!(cursor.next_seq, 1);
    }

    #[test]
    fn test_group_start_waits_for_its_level() {
        let mut engine = engine();
        let mut cursor = EmitCursor::default();
        let mut start = OutputEvent::new("┌────", "stdout");
        start.group = Some(GroupMarker::Start);
        engine.state.ingest(&start, 1_000);
        emit_post_message_events(&engine.state, &mut cursor);
        assert_eq!(cursor.next_seq, 0);

        engine
            .state
            .ingest(&OutputEvent::new("error: boom", "stdout"), 1_001);
        emit_post_message_events(&engine.state, &mut cursor);
        assert_eq!(cursor.next_seq, 2);
        assert_eq!(engine.state.store.get(0).unwrap().level, LogLevel::Error);
    }

    #[test]
    fn test_held_back_start_flushed_when_settling_all() {
        let mut engine = engine();
        let mut cursor = EmitCursor::default();
        let mut start = OutputEvent::new("┌────", "stdout");
        start.group = Some(GroupMarker::StartCollapsed);
        engine.state.ingest(&start, 1_000);
        emit_records(&engine.state, &mut cursor, false);
        assert_eq!(cursor.next_seq, 0);

        emit_records(&engine.state, &mut cursor, true);
        assert_eq!(cursor.next_seq, 1);
    }

    #[test]
    fn test_loaded_records_are_emitted_as_settled() {
        let temp = tempfile::tempdir().unwrap();
        let saved = temp.path().join("saved.json");
        std::fs::write(
            &saved,
            r#"[{"id":"a","timestamp":1,"level":"info","message":"┌ group",
                "category":"stdout","sessionId":"old","group":"start"}]"#,
        )
        .unwrap();

        let mut engine = engine();
        let mut cursor = EmitCursor::default();
        engine.load_file(saved);
        report_load(&engine.state, &mut cursor);
        assert_eq!(engine.state.store.len(), 1);
        assert_eq!(cursor.next_seq, engine.state.store.next_seq());
    }

    #[test]
    fn test_failed_load_leaves_cursor() {
        let temp = tempfile::tempdir().unwrap();
        let mut engine = engine();
        let mut cursor = EmitCursor::default();
        engine.load_file(temp.path().join("missing.json"));
        report_load(&engine.state, &mut cursor);
        assert_eq!(cursor.next_seq, 0);
    }
}
