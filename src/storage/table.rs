//! Generic table repository for JSON storage
//!
//! Each table is one JSON file holding every row of one entity type. Rows
//! are kept in memory keyed by the entity key and written back whole.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{PocketbookError, PocketbookResult};
use crate::models::Entity;

use super::file_io::{read_json, write_json_atomic};

/// On-disk layout of a table file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableData<T> {
    rows: Vec<T>,
}

impl<T> Default for TableData<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

/// Repository for one table
pub struct TableRepository<T: Entity> {
    path: PathBuf,
    data: RwLock<HashMap<T::Key, T>>,
}

impl<T: Entity> TableRepository<T> {
    /// Create a new repository backed by `path`
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load rows from disk
    pub fn load(&self) -> PocketbookResult<()> {
        let file_data: TableData<T> = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            PocketbookError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for row in file_data.rows {
            data.insert(row.key(), row);
        }

        Ok(())
    }

    /// Save rows to disk
    pub fn save(&self) -> PocketbookResult<()> {
        let file_data = TableData {
            rows: self.get_all()?,
        };

        write_json_atomic(&self.path, &file_data)
    }

    /// Get a row by key
    pub fn get(&self, key: &T::Key) -> PocketbookResult<Option<T>> {
        let data = self.data.read().map_err(|e| {
            PocketbookError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(key).cloned())
    }

    /// Get all rows, ordered by document id
    pub fn get_all(&self) -> PocketbookResult<Vec<T>> {
        let data = self.data.read().map_err(|e| {
            PocketbookError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut rows: Vec<_> = data.values().cloned().collect();
        rows.sort_by_key(|row| row.document_id());
        Ok(rows)
    }

    /// Insert or replace rows
    pub fn upsert_many(&self, rows: &[T]) -> PocketbookResult<()> {
        let mut data = self.data.write().map_err(|e| {
            PocketbookError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        for row in rows {
            data.insert(row.key(), row.clone());
        }
        Ok(())
    }

    /// Remove rows by key, returning the rows that were present
    pub fn delete_many(&self, rows: &[T]) -> PocketbookResult<Vec<T>> {
        let mut data = self.data.write().map_err(|e| {
            PocketbookError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(rows
            .iter()
            .filter_map(|row| data.remove(&row.key()))
            .collect())
    }

    /// Remove every row, returning what was removed
    pub fn delete_all(&self) -> PocketbookResult<Vec<T>> {
        let mut data = self.data.write().map_err(|e| {
            PocketbookError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(data.drain().map(|(_, row)| row).collect())
    }

    /// Count rows
    pub fn count(&self) -> PocketbookResult<usize> {
        let data = self.data.read().map_err(|e| {
            PocketbookError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.len())
    }
}
