//! Message types for the application (TEA pattern)

use std::path::PathBuf;

use dcplus_core::{InboundEvent, LogLevel};
use serde_json::Value;

use crate::input_key::InputKey;

/// All possible messages/actions in the application
#[derive(Debug, Clone)]
pub enum Message {
    /// Keyboard event from terminal
    Key(InputKey),

    /// Log area was resized (rows and columns available to the list)
    Resize { width: u16, height: u16 },

    /// Periodic tick for the persistence window
    Tick,

    /// Request application quit
    Quit,

    // ─────────────────────────────────────────────────────────
    // Protocol Input
    // ─────────────────────────────────────────────────────────
    /// Event decoded from the debug adapter stream
    Inbound(InboundEvent),

    /// The input stream reached EOF or failed
    InputClosed,

    // ─────────────────────────────────────────────────────────
    // Filter Messages
    // ─────────────────────────────────────────────────────────
    /// Toggle one level in the active set
    ToggleLevel(LogLevel),

    /// Replace the search text
    SetSearch(String),

    /// Enter search input mode
    StartSearchInput,

    /// Leave search input mode, keeping the query
    ExitSearchInput,

    /// Toggle regex interpretation of the search text
    ToggleRegex,

    /// Toggle AND/OR combination of level and search
    ToggleCombineMode,

    // ─────────────────────────────────────────────────────────
    // Store Messages
    // ─────────────────────────────────────────────────────────
    /// Clear all records
    ClearLogs,

    /// Load the workspace snapshot
    RequestLoad,

    /// Snapshot entries read from disk, validated on arrival
    LoadEntries(Vec<Value>),

    /// Export the filtered view (or the selection) to a text file
    RequestExport,

    /// Export finished
    Exported { path: PathBuf, lines: usize },

    /// Save every stored record as a JSON snapshot
    RequestSave,

    /// Save finished
    Saved { path: PathBuf, records: usize },

    /// A background action failed
    ActionFailed(String),

    // ─────────────────────────────────────────────────────────
    // Scrolling
    // ─────────────────────────────────────────────────────────
    ScrollUp,
    ScrollDown,
    /// Scroll by a row delta (mouse wheel)
    ScrollBy(i64),
    PageUp,
    PageDown,
    ScrollToTop,
    ScrollToBottom,

    // ─────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────
    /// Start a selection at the bottom visible record, or stop it
    ToggleSelection,
    /// Move the selection cursor one record up
    SelectionUp,
    /// Move the selection cursor one record down
    SelectionDown,
    ClearSelection,

    // ─────────────────────────────────────────────────────────
    // Display
    // ─────────────────────────────────────────────────────────
    CycleTimestampMode,
    ToggleCompact,
    ToggleTagHighlight,
}
