//! Settings parser for .dcplus/config.toml

use super::types::Settings;
use dcplus_core::prelude::*;
use dcplus_core::SNAPSHOT_DIR;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.toml";

/// Load settings from .dcplus/config.toml
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(workspace: &Path) -> Settings {
    let config_path = workspace.join(SNAPSHOT_DIR).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<Settings>(&content) {
            Ok(settings) => match validate(&settings) {
                Ok(()) => {
                    debug!("Loaded settings from {:?}", config_path);
                    settings
                }
                Err(e) => {
                    warn!("Ignoring {:?}: {}", config_path, e);
                    Settings::default()
                }
            },
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

fn validate(settings: &Settings) -> Result<()> {
    if settings.store.max_logs == 0 {
        return Err(Error::config_invalid("store.max_logs must be at least 1"));
    }
    Ok(())
}

/// Create a commented default config in .dcplus/
pub fn init_config_dir(workspace: &Path) -> Result<()> {
    let dir = workspace.join(SNAPSHOT_DIR);

    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::config(format!("Failed to create .dcplus dir: {}", e)))?;
    }

    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        let default_content = r#"# Debug Console Plus Configuration

[store]
max_logs = 10000         # Oldest records are evicted past this
persist = true           # Write .dcplus/logs.json
write_debounce_ms = 500  # Coalesce snapshot writes within this window

[filter]
default_levels = ["info", "warn", "error"]
use_regex = false
combine_mode = "and"     # "and" | "or"

[ui]
timestamp_mode = "absolute"       # "absolute" | "relative" | "hidden"
auto_hide_timestamps_width = 60   # Hide timestamps below this width
buffer_rows = 10
follow_threshold = 2
compact = false
highlight_tags = true
"#;
        std::fs::write(&config_path, default_content)
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
        info!("Created default config at {:?}", config_path);
    }

    Ok(())
}
