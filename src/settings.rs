// src/settings.rs
// =============================================================================
// Persisted settings: a small JSON key-value file.
//
// The only key we care about is `extensionEnabled` (default true). Other
// keys in the file are left alone when we write it back.
//
// The flag is read when a page loads and written when the user toggles it.
// Turning it off does not stop a scan that's already running; it only
// keeps the next page load from scanning.
// =============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::SettingsError;

const ENABLED_KEY: &str = "extensionEnabled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub extension_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extension_enabled: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `path` if given, else `<config dir>/link-beacon/storage.json`.
    pub fn open(path: Option<PathBuf>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Ok(Self::new(path)),
            None => {
                let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
                Ok(Self::new(dir.join("link-beacon").join("storage.json")))
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Settings, SettingsError> {
        let entries = self.read_entries().await?;

        // Anything that isn't literally `false` counts as enabled
        let enabled = !matches!(entries.get(ENABLED_KEY), Some(Value::Bool(false)));
        Ok(Settings {
            extension_enabled: enabled,
        })
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<Settings, SettingsError> {
        let mut entries = self.read_entries().await?;
        entries.insert(ENABLED_KEY.to_string(), Value::Bool(enabled));

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(&entries).map_err(|e| self.json_error(e))?;
        tokio::fs::write(&self.path, json).await.map_err(|e| self.io_error(e))?;

        info!(enabled, path = %self.path.display(), "extension toggled");
        Ok(Settings {
            extension_enabled: enabled,
        })
    }

    async fn read_entries(&self) -> Result<Map<String, Value>, SettingsError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file yet");
                return Ok(Map::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&text).map_err(|e| self.json_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn json_error(&self, source: serde_json::Error) -> SettingsError {
        SettingsError::Json {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_means_enabled() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("storage.json"));
        assert!(store.load().await.unwrap().extension_enabled);
    }

    #[tokio::test]
    async fn test_toggle_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");
        let store = SettingsStore::new(&path);

        store.set_enabled(false).await.unwrap();
        assert!(!SettingsStore::new(&path).load().await.unwrap().extension_enabled);

        store.set_enabled(true).await.unwrap();
        assert!(store.load().await.unwrap().extension_enabled);
    }

    #[tokio::test]
    async fn test_other_keys_survive_a_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        tokio::fs::write(&path, r#"{"theme": "dark"}"#).await.unwrap();

        SettingsStore::new(&path).set_enabled(false).await.unwrap();

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["extensionEnabled"], false);
    }

    #[tokio::test]
    async fn test_garbage_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let err = SettingsStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, SettingsError::Json { .. }));
    }
}
