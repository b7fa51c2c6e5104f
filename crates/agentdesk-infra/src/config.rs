//! Configuration loader for agentdesk.
//!
//! Reads `config.toml` from the data directory (`~/.agentdesk/` by default)
//! and deserializes it into [`AppConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use agentdesk_types::config::AppConfig;

/// Env var that relocates the data directory.
pub const DATA_DIR_ENV: &str = "AGENTDESK_DATA_DIR";

/// Resolve the data directory: `AGENTDESK_DATA_DIR`, else `~/.agentdesk`,
/// else `./.agentdesk`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".agentdesk");
    }

    PathBuf::from(".agentdesk")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`AppConfig::default()`].
/// - Unreadable or unparseable file: logs a warning, returns the default.
pub async fn load_app_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}
