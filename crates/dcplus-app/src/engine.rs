//! Engine - shared orchestration for the TUI and headless runners
//!
//! Owns the application state and the message channel every input source
//! (stream reader, signal handler, terminal events, background actions)
//! feeds into.

use std::path::PathBuf;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::actions::execute_action;
use crate::config::{self, Settings};
use crate::handler::UpdateAction;
use crate::input::{spawn_input_reader, InputSource};
use crate::message::Message;
use crate::process;
use crate::signals;
use crate::state::AppState;

/// Capacity of the unified message channel
pub const MESSAGE_CHANNEL_CAPACITY: usize = 1024;

pub struct Engine {
    /// TEA application state (the Model)
    pub state: AppState,

    /// Clone this to give to input sources.
    pub msg_tx: mpsc::Sender<Message>,

    /// The frontend event loop drains messages from here.
    pub msg_rx: mpsc::Receiver<Message>,
}

impl Engine {
    /// Create an Engine for a workspace.
    ///
    /// Initializes `.dcplus/`, loads settings, builds state and the message
    /// channel, and spawns the signal handler. Must run inside a tokio
    /// runtime.
    pub fn new(workspace: PathBuf) -> Self {
        if let Err(e) = config::init_config_dir(&workspace) {
            warn!("Failed to initialize .dcplus directory: {}", e);
        }
        let settings = config::load_settings(&workspace);
        info!(
            "Loaded settings: max_logs={} persist={}",
            settings.store.max_logs, settings.store.persist
        );

        let engine = Self::with_settings(workspace, settings);
        signals::spawn_signal_handler(engine.msg_sender());
        engine
    }

    /// Engine without config discovery or signal handling
    pub fn with_settings(workspace: PathBuf, settings: Settings) -> Self {
        let state = AppState::new(workspace, settings);
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(MESSAGE_CHANNEL_CAPACITY);
        Self {
            state,
            msg_tx,
            msg_rx,
        }
    }

    /// Get a clone of the message sender for spawning input sources.
    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    /// Start reading the debug adapter stream.
    pub fn spawn_input(&self, source: InputSource) {
        info!("Reading debug output from {:?}", source);
        spawn_input_reader(source, self.msg_sender());
    }

    /// Bulk-load a snapshot file, replacing the store.
    ///
    /// Runs to completion before returning so the loaded records come
    /// ahead of anything the stream delivers. Failures land in the status.
    pub fn load_file(&mut self, path: PathBuf) {
        info!("Loading records from {}", path.display());
        let reply = execute_action(UpdateAction::LoadSnapshot { path });
        self.process_message(reply);
    }

    /// Process a single message through the TEA update cycle.
    pub fn process_message(&mut self, msg: Message) {
        process::process_message(&mut self.state, msg, &self.msg_tx);
    }

    /// Drain and process all pending messages. Returns how many ran.
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
            count += 1;
        }
        count
    }

    /// Give the snapshot writer a chance to run.
    pub fn poll_persist(&mut self) {
        self.state.poll_persist(Instant::now());
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit()
    }

    /// Final synchronous snapshot write
    pub fn shutdown(&mut self) {
        self.state.flush();
        info!(
            "Shutdown: {} records, {} snapshot writes, {} failures",
            self.state.store.len(),
            self.state.store.scheduler().writes(),
            self.state.store.scheduler().failures()
        );
    }
}
