//! Path management for pocketbook
//!
//! Provides platform path resolution for configuration, data, and the audit log.
//!
//! ## Path Resolution Order
//!
//! 1. `POCKETBOOK_DATA_DIR` environment variable (if set)
//! 2. The platform configuration directory joined with `pocketbook`
//!    (`~/.config/pocketbook` on Linux, `%APPDATA%\pocketbook` on Windows)

use std::path::PathBuf;

use directories::BaseDirs;

use crate::error::PocketbookError;
use crate::models::TableName;

/// Manages all paths used by pocketbook
#[derive(Debug, Clone)]
pub struct PocketbookPaths {
    /// Base directory for all pocketbook data
    base_dir: PathBuf,
}

impl PocketbookPaths {
    /// Create a new PocketbookPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, PocketbookError> {
        let base_dir = if let Ok(custom) = std::env::var("POCKETBOOK_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create PocketbookPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (one JSON file per table)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path to the per-table update time ledger
    pub fn update_times_file(&self) -> PathBuf {
        self.data_dir().join("update_times.json")
    }

    /// Get the path of the JSON file backing a table
    pub fn table_file(&self, table: TableName) -> PathBuf {
        self.data_dir().join(format!("{}.json", table.file_stem()))
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), PocketbookError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| PocketbookError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| PocketbookError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if pocketbook has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, PocketbookError> {
    let dirs = BaseDirs::new()
        .ok_or_else(|| PocketbookError::Config("Could not determine home directory".into()))?;
    Ok(dirs.config_dir().join("pocketbook"))
}
