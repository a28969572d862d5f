//! User settings for pocketbook
//!
//! Manages user preferences: display currency, language, theme, and the
//! signed-in identity used for remote reconciliation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::PocketbookPaths;
use crate::error::PocketbookError;

/// Theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppTheme {
    #[default]
    Light,
    Dark,
    /// Follow the device setting
    Device,
}

impl AppTheme {
    /// Parse a theme from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "device" | "system" => Some(Self::Device),
            _ => None,
        }
    }
}

/// User settings for pocketbook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Default currency for new accounts
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Interface language code
    #[serde(default = "default_language_code")]
    pub language_code: String,

    /// Theme preference
    #[serde(default)]
    pub theme: AppTheme,

    /// Whether initial setup has been completed
    #[serde(default)]
    pub setup_completed: bool,

    /// Signed-in user; remote reconciliation is keyed by this identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Root directory of the remote document store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_dir: Option<PathBuf>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_language_code() -> String {
    "en".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency: default_currency(),
            language_code: default_language_code(),
            theme: AppTheme::default(),
            setup_completed: false,
            user_id: None,
            remote_dir: None,
        }
    }
}

impl Settings {
    /// Whether a remote store is configured for a signed-in user
    pub fn remote_enabled(&self) -> bool {
        self.user_id.is_some() && self.remote_dir.is_some()
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &PocketbookPaths) -> Result<Self, PocketbookError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                PocketbookError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                PocketbookError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &PocketbookPaths) -> Result<(), PocketbookError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            PocketbookError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(&settings_path, contents).map_err(|e| {
            PocketbookError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}
