use super::models::AppConfig;
use super::tables::ConfigTables;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from `path`, falling back to defaults when the file is
/// missing or unreadable.
pub fn load_config(path: &Path) -> AppConfig {
    match fs::read_to_string(path) {
        Ok(raw) => parse_config(&raw),
        Err(err) => {
            info!(path = %path.display(), "No config file loaded ({err}); using defaults");
            AppConfig::default()
        }
    }
}

/// Parse a TOML configuration string. Invalid TOML falls back to defaults
/// rather than aborting the session.
pub fn parse_config(raw: &str) -> AppConfig {
    match toml::from_str::<ConfigTables>(raw) {
        Ok(tables) => {
            debug!("Parsed configuration");
            tables.into()
        }
        Err(err) => {
            warn!("Invalid configuration; using defaults: {err}");
            AppConfig::default()
        }
    }
}
