//! User-facing settings persistence.
//!
//! A flat JSON object stored at `$XDG_CONFIG_HOME/termhop/settings.json`.
//! Command execution never reads it; it exists for front ends that want to
//! remember things like the last host or preferred shell.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::warn;

use crate::Result;

/// Settings mapping as stored on disk.
pub type Settings = Map<String, Value>;

/// JSON file backed key/value store.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform config directory, if one can be determined.
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join("termhop").join("settings.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings.
    ///
    /// A missing file is an empty mapping. An unreadable or malformed file
    /// is logged and also treated as empty.
    pub fn load(&self) -> Settings {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Settings::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read settings");
                return Settings::new();
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!(path = %self.path.display(), "settings file is not a JSON object");
                Settings::new()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to parse settings");
                Settings::new()
            }
        }
    }

    /// Save the settings as pretty-printed JSON, creating parent directories.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
