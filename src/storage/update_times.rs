//! Per-table update-time ledger
//!
//! Holds the epoch-millisecond timestamp of the last write to each table. A
//! table with no entry has never been written.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{PocketbookError, PocketbookResult};
use crate::models::TableName;

use super::file_io::{read_json, write_json_atomic};

pub struct UpdateTimeLedger {
    path: PathBuf,
    times: RwLock<BTreeMap<TableName, i64>>,
}

impl UpdateTimeLedger {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            times: RwLock::new(BTreeMap::new()),
        }
    }

    /// Load the ledger from disk
    pub fn load(&self) -> PocketbookResult<()> {
        let stored: BTreeMap<TableName, i64> = read_json(&self.path)?;

        let mut times = self.times.write().map_err(|e| {
            PocketbookError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        *times = stored;
        Ok(())
    }

    /// Save the ledger to disk
    pub fn save(&self) -> PocketbookResult<()> {
        let times = self.times.read().map_err(|e| {
            PocketbookError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        write_json_atomic(&self.path, &*times)
    }

    /// Last write time of `table`, `None` if never written
    pub fn get(&self, table: TableName) -> PocketbookResult<Option<i64>> {
        let times = self.times.read().map_err(|e| {
            PocketbookError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(times.get(&table).copied())
    }

    /// Record a write time for `table` and persist the ledger
    pub fn set(&self, table: TableName, timestamp: i64) -> PocketbookResult<()> {
        {
            let mut times = self.times.write().map_err(|e| {
                PocketbookError::Storage(format!("Failed to acquire write lock: {}", e))
            })?;
            times.insert(table, timestamp);
        }
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_entry_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = UpdateTimeLedger::new(temp_dir.path().join("update_times.json"));
        ledger.load().unwrap();
        assert_eq!(ledger.get(TableName::Account).unwrap(), None);
    }

    #[test]
    fn test_set_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("update_times.json");

        let ledger = UpdateTimeLedger::new(path.clone());
        ledger.set(TableName::Record, 100).unwrap();
        ledger.set(TableName::Budget, 50).unwrap();

        let reopened = UpdateTimeLedger::new(path);
        reopened.load().unwrap();
        assert_eq!(reopened.get(TableName::Record).unwrap(), Some(100));
        assert_eq!(reopened.get(TableName::Budget).unwrap(), Some(50));
        assert_eq!(reopened.get(TableName::Widget).unwrap(), None);
    }
}
