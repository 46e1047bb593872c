//! Main TUI runner - entry point and event loop
//!
//! The Engine owns state and the message channel; this module adds the
//! terminal: each loop iteration drains pending messages, asks the viewport
//! for a frame, draws only when one is due, then polls terminal input.

use std::path::{Path, PathBuf};
use std::time::Duration;

use dcplus_app::message::Message;
use dcplus_app::{Engine, InputSource};
use dcplus_core::prelude::*;

use crate::measure::WrapMeasurer;
use crate::{event, layout, render, terminal};

/// Terminal poll timeout, roughly one frame at 60 fps
const FRAME_POLL: Duration = Duration::from_millis(16);

/// Run the TUI over `workspace`, optionally reading a debug adapter stream.
///
/// `load` names a snapshot file to load before the stream starts.
pub async fn run_with_workspace(
    workspace: &Path,
    input: Option<InputSource>,
    load: Option<PathBuf>,
) -> Result<()> {
    terminal::install_panic_hook();

    let mut engine = Engine::new(workspace.to_path_buf());
    if let Some(path) = load {
        engine.load_file(path);
    }
    if let Some(source) = input {
        engine.spawn_input(source);
    }

    let mut term = terminal::init()?;

    let size = term.size()?;
    let (width, height) = layout::viewport_size(size.width, size.height);
    engine.process_message(Message::Resize { width, height });

    let result = run_loop(&mut term, &mut engine);

    engine.shutdown();
    terminal::restore();

    result
}

fn run_loop(terminal: &mut ratatui::DefaultTerminal, engine: &mut Engine) -> Result<()> {
    while !engine.should_quit() {
        engine.drain_pending_messages();
        engine.poll_persist();

        let state = &mut engine.state;
        let measurer = WrapMeasurer::for_state(state);
        let view = state.filter.view(&state.store);
        let has_selection = state.selection.is_some();
        if let Some(window) = state.viewport.frame(&view, &measurer, has_selection) {
            let state = &engine.state;
            terminal.draw(|frame| render::view(frame, state, &window))?;
        }

        if let Some(message) = event::poll(FRAME_POLL)? {
            engine.process_message(message);
        }
    }

    debug!(
        "Frames rendered: {}, skipped: {}",
        engine.state.viewport.frames_rendered(),
        engine.state.viewport.frames_skipped()
    );
    Ok(())
}
