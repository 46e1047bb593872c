//! Handler module - TEA update function and event handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch
//! - `keys`: Key event handlers for UI modes
//! - `filter`: Filter bar handlers
//! - `store`: Clear, load, save and export handlers
//! - `scroll`: Scroll and selection handlers

pub(crate) mod filter;
pub(crate) mod keys;
pub(crate) mod scroll;
pub(crate) mod store;
pub(crate) mod update;


use std::path::PathBuf;

use dcplus_core::LogRecord;

use crate::message::Message;

// Re-export main entry point
pub use update::update;

pub use keys::handle_key;

/// Actions that the event loop should perform after update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateAction {
    /// Read a snapshot file and send its entries back as `LoadEntries`
    LoadSnapshot { path: PathBuf },

    /// Write export lines to a text file
    Export { path: PathBuf, lines: Vec<String> },

    /// Write records in snapshot format, loadable with `LoadSnapshot`
    Save { path: PathBuf, records: Vec<LogRecord> },
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the event loop to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }
}
