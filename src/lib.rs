//! Debug Console Plus Library
//!
//! A terminal debug console: classifies debug adapter output, keeps a
//! bounded persisted log, and lets you filter and scroll it.

pub mod headless;
pub mod query;

use std::path::{Path, PathBuf};

use dcplus_app::InputSource;
use dcplus_core::prelude::*;

pub use headless::runner::run_headless;
pub use query::run_query_command;

/// Interactive entry point
pub async fn run_with_workspace(
    workspace: &Path,
    input: Option<InputSource>,
    load: Option<PathBuf>,
) -> Result<()> {
    color_eyre::install().map_err(|e| Error::terminal(e.to_string()))?;
    dcplus_core::logging::init()?;

    info!("Workspace: {}", workspace.display());

    let result = dcplus_tui::run_with_workspace(workspace, input, load).await;
    match result {
        Err(ref e) if e.is_fatal() => error!("Application error: {:?}", e),
        Err(ref e) => warn!("Application exited with error: {}", e),
        Ok(()) => {}
    }

    info!("Debug Console Plus exiting");
    result
}
