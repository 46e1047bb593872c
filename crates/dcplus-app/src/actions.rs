//! Action handlers: UpdateAction dispatch on blocking tasks
//!
//! Every action does file IO off the update loop and reports back with a
//! message, so the handler never blocks on the filesystem.

use std::fs;
use std::path::Path;

use dcplus_core::prelude::*;
use dcplus_core::{parse_entries, read_snapshot_text, write_snapshot};
use tokio::sync::mpsc;

use crate::handler::UpdateAction;
use crate::message::Message;

/// Execute an action by spawning a blocking task
pub fn handle_action(action: UpdateAction, msg_tx: mpsc::Sender<Message>) {
    tokio::task::spawn_blocking(move || {
        let reply = execute_action(action);
        let _ = msg_tx.blocking_send(reply);
    });
}

/// Run an action to completion and build the reply message
pub fn execute_action(action: UpdateAction) -> Message {
    match action {
        UpdateAction::LoadSnapshot { path } => match read_entries(&path) {
            Ok(entries) => {
                info!("Read {} entries from {}", entries.len(), path.display());
                Message::LoadEntries(entries)
            }
            Err(e) => {
                if e.is_recoverable() {
                    warn!("Load failed: {}", e);
                } else {
                    error!("Load failed: {}", e);
                }
                Message::ActionFailed(format!("Load failed: {}", e))
            }
        },
        UpdateAction::Export { path, lines } => match write_export(&path, &lines) {
            Ok(()) => {
                info!("Exported {} lines to {}", lines.len(), path.display());
                Message::Exported {
                    path,
                    lines: lines.len(),
                }
            }
            Err(e) => Message::ActionFailed(format!("Export failed: {}", e)),
        },
        UpdateAction::Save { path, records } => match write_snapshot(&path, &records) {
            Ok(()) => {
                info!("Saved {} records to {}", records.len(), path.display());
                Message::Saved {
                    path,
                    records: records.len(),
                }
            }
            Err(e) => {
                error!("Save failed: {}", e);
                Message::ActionFailed(format!("Save failed: {}", e))
            }
        },
    }
}

fn read_entries(path: &Path) -> Result<Vec<serde_json::Value>> {
    let text = read_snapshot_text(path)?;
    parse_entries(&text)
}

fn write_export(path: &Path, lines: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}
