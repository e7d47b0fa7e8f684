//! Local configuration store
//!
//! Persists the last known `incognito` flag as a start-up hint. The backend's
//! live status always wins; nothing in this crate reads the hint to decide
//! what to render or what to write.

use incognito_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name used under the platform config directory
pub const CONFIG_FILE_NAME: &str = "incognito.json";

/// Persistent application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredIncognitoConfig {
    /// Front-end settings section
    #[serde(default)]
    pub frontend: FrontendSettings,
}

/// Front-end settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontendSettings {
    /// Last incognito flag observed from the backend
    #[serde(
        rename = "incognitoMode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub incognito_mode: Option<bool>,
    /// Settings owned by other parts of the application, kept verbatim
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// JSON-file configuration store
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform default location
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    /// Platform config directory joined with [`CONFIG_FILE_NAME`]
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "incognito-session")
            .ok_or_else(|| Error::Config("No home directory available".to_string()))?;
        Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load configuration; a missing file yields the default
    pub fn load(&self) -> Result<StoredIncognitoConfig> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(StoredIncognitoConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write configuration via a temp file and rename
    pub fn save(&self, config: &StoredIncognitoConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(config)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Stored incognito flag, if any
    pub fn incognito_hint(&self) -> Result<Option<bool>> {
        Ok(self.load()?.frontend.incognito_mode)
    }

    /// Update the stored incognito flag, keeping other settings
    pub fn set_incognito_hint(&self, incognito: bool) -> Result<()> {
        let mut config = self.load()?;
        if config.frontend.incognito_mode == Some(incognito) {
            return Ok(());
        }
        config.frontend.incognito_mode = Some(incognito);
        self.save(&config)
    }
}
