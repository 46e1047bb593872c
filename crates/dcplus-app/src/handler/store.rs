//! Clear, load, save and export handlers

use std::path::PathBuf;

use dcplus_core::{validate_entries, Error};
use serde_json::Value;
use tracing::{info, warn};

use crate::state::{AppState, StatusKind};

use super::{UpdateAction, UpdateResult};

pub fn handle_clear(state: &mut AppState) -> UpdateResult {
    state.clear_logs();
    state.set_status(StatusKind::Info, "Cleared");
    UpdateResult::none()
}

pub fn handle_request_load(state: &mut AppState) -> UpdateResult {
    UpdateResult::action(UpdateAction::LoadSnapshot {
        path: state.snapshot_path(),
    })
}

/// Validate each entry on its own; a load with no valid entry changes nothing.
pub fn handle_load_entries(state: &mut AppState, entries: Vec<Value>) -> UpdateResult {
    match validate_entries(entries) {
        Ok(report) => {
            let loaded = report.records.len();
            state.replace_records(report.records);
            let text = if report.skipped > 0 {
                format!("Loaded {} records ({} invalid skipped)", loaded, report.skipped)
            } else {
                format!("Loaded {} records", loaded)
            };
            info!("{}", text);
            state.set_status(StatusKind::Info, text);
        }
        Err(Error::LoadRejected { skipped }) => {
            warn!("Load rejected: {} invalid entries", skipped);
            state.set_status(
                StatusKind::Error,
                format!("Nothing to load ({} invalid entries)", skipped),
            );
        }
        Err(e) => state.set_status(StatusKind::Error, e.to_string()),
    }
    state.viewport.request_render(true);
    UpdateResult::none()
}

pub fn handle_request_export(state: &mut AppState) -> UpdateResult {
    let lines = state.export_lines();
    if lines.is_empty() {
        state.set_status(StatusKind::Info, "Nothing to export");
        state.viewport.request_render(true);
        return UpdateResult::none();
    }
    UpdateResult::action(UpdateAction::Export {
        path: state.export_path(),
        lines,
    })
}

pub fn handle_exported(state: &mut AppState, path: PathBuf, lines: usize) -> UpdateResult {
    state.set_status(
        StatusKind::Info,
        format!("Exported {} lines to {}", lines, path.display()),
    );
    state.viewport.request_render(true);
    UpdateResult::none()
}

/// The full store, not just the filtered view
pub fn handle_request_save(state: &mut AppState) -> UpdateResult {
    if state.store.is_empty() {
        state.set_status(StatusKind::Info, "Nothing to save");
        state.viewport.request_render(true);
        return UpdateResult::none();
    }
    UpdateResult::action(UpdateAction::Save {
        path: state.save_path(),
        records: state.store.iter().cloned().collect(),
    })
}

pub fn handle_saved(state: &mut AppState, path: PathBuf, records: usize) -> UpdateResult {
    state.set_status(
        StatusKind::Info,
        format!("Saved {} records to {}", records, path.display()),
    );
    state.viewport.request_render(true);
    UpdateResult::none()
}
