//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use tascboard_common::{Error, Result};
use tascboard_sync::AutoSyncConfig;

/// Application configuration, stored as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Auto-sync behavior of the detail editors.
    pub auto_sync: AutoSyncConfig,
    /// Log filter directive (e.g., "info" or "tascboard_sync=debug").
    pub log_level: Option<String>,
}

impl AppConfig {
    /// File name inside the configuration directory.
    pub const FILE_NAME: &'static str = "config.json";

    /// Default location: `<config dir>/tascboard/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tascboard").join(Self::FILE_NAME))
    }

    /// Load configuration from a file.
    ///
    /// # Postconditions
    /// - A missing file yields the defaults
    ///
    /// # Errors
    /// - File unreadable
    /// - File is not valid configuration JSON
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load from an explicit path, or from the default location.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }
}
