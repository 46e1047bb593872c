//! Configuration file parsing for Debug Console Plus
//!
//! Supports `.dcplus/config.toml` in the workspace directory.

pub mod settings;
pub mod types;

pub use settings::{init_config_dir, load_settings};
pub use types::*;
