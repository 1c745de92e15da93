//! Configuration loading from file system
//!
//! Reads and writes `~/.filepane/config.json`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::types::Config;

/// Default config location (~/.filepane/config.json)
pub fn default_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde("~/.filepane/config.json").as_ref())
}

/// Load configuration from ~/.filepane/config.json
///
/// Returns Config::default() if the file is missing or invalid.
pub fn load_config() -> Config {
    load_config_from(&default_config_path())
}

/// Load configuration from an explicit path
///
/// Missing fields take their defaults; any read or parse failure is logged
/// and yields Config::default().
#[instrument(name = "load_config")]
pub fn load_config_from(config_path: &Path) -> Config {
    if !config_path.exists() {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        return Config::default();
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            warn!(
                error = %e,
                path = %config_path.display(),
                "Failed to read config file, using defaults"
            );
            return Config::default();
        }
    };

    match serde_json::from_str::<Config>(&content) {
        Ok(config) => {
            info!(path = %config_path.display(), "Successfully loaded config");
            config
        }
        Err(e) => {
            let error_hint = if e.to_string().contains("viewMode") {
                "\n\nHint: 'ui.viewMode' must be \"grid\" or \"list\"."
            } else {
                ""
            };

            warn!(
                error = %e,
                hint = %error_hint,
                "Failed to parse config JSON, using defaults"
            );
            Config::default()
        }
    }
}

impl Config {
    /// Save to disk using atomic write (write temp + rename)
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, &json)
            .with_context(|| format!("Failed to write temp config file: {}", temp_path.display()))?;

        // Atomic rename (on Unix, this is atomic; on Windows, it's best-effort)
        std::fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to rename temp file to {}", path.display()))?;

        info!(path = %path.display(), bytes = json.len(), "Saved config (atomic)");
        Ok(())
    }
}
