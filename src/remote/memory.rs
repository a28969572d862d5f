//! In-process remote store
//!
//! Keeps every user's documents in memory. The `offline` switch makes every
//! call fail, which is how the failure paths of reconciliation are tested.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use serde_json::Value;

use crate::error::{PocketbookError, PocketbookResult};
use crate::models::TableName;

use super::{Document, DocumentBatch, RemoteStore, UpdateTimeDocument};

#[derive(Debug, Default)]
struct UserData {
    update_times: BTreeMap<String, UpdateTimeDocument>,
    collections: HashMap<String, BTreeMap<String, Value>>,
}

#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    users: RwLock<HashMap<String, UserData>>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful write calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> PocketbookResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PocketbookError::Remote("Remote store is unreachable".into()));
        }
        Ok(())
    }
}

impl RemoteStore for MemoryRemoteStore {
    fn get_update_time(&self, user_id: &str, table: TableName) -> PocketbookResult<Option<i64>> {
        self.ensure_online()?;
        let users = self
            .users
            .read()
            .map_err(|e| PocketbookError::Remote(format!("Failed to acquire read lock: {}", e)))?;

        Ok(users
            .get(user_id)
            .and_then(|user| user.update_times.get(table.name()))
            .map(|document| document.timestamp))
    }

    fn save_update_time(
        &self,
        user_id: &str,
        table: TableName,
        timestamp: i64,
    ) -> PocketbookResult<()> {
        self.ensure_online()?;
        let mut users = self
            .users
            .write()
            .map_err(|e| PocketbookError::Remote(format!("Failed to acquire write lock: {}", e)))?;

        users.entry(user_id.to_string()).or_default().update_times.insert(
            table.name().to_string(),
            UpdateTimeDocument {
                table_name: table.name().to_string(),
                timestamp,
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn get_documents(&self, user_id: &str, collection: &str) -> PocketbookResult<Vec<Document>> {
        self.ensure_online()?;
        let users = self
            .users
            .read()
            .map_err(|e| PocketbookError::Remote(format!("Failed to acquire read lock: {}", e)))?;

        Ok(users
            .get(user_id)
            .and_then(|user| user.collections.get(collection))
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn write_batch(
        &self,
        user_id: &str,
        collection: &str,
        batch: &DocumentBatch,
    ) -> PocketbookResult<()> {
        self.ensure_online()?;
        let mut users = self
            .users
            .write()
            .map_err(|e| PocketbookError::Remote(format!("Failed to acquire write lock: {}", e)))?;

        let documents = users
            .entry(user_id.to_string())
            .or_default()
            .collections
            .entry(collection.to_string())
            .or_default();
        for id in &batch.delete {
            documents.remove(id);
        }
        for document in &batch.upsert {
            documents.insert(document.id.clone(), document.data.clone());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_deletes_then_upserts() {
        let store = MemoryRemoteStore::new();
        let upsert = DocumentBatch {
            delete: Vec::new(),
            upsert: vec![
                Document {
                    id: "b".into(),
                    data: json!({"v": 1}),
                },
                Document {
                    id: "a".into(),
                    data: json!({"v": 2}),
                },
            ],
        };
        store.write_batch("u", "records", &upsert).unwrap();

        let replace = DocumentBatch {
            delete: vec!["a".into(), "b".into()],
            upsert: vec![Document {
                id: "b".into(),
                data: json!({"v": 3}),
            }],
        };
        store.write_batch("u", "records", &replace).unwrap();

        let documents = store.get_documents("u", "records").unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].data, json!({"v": 3}));
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn test_offline_fails_every_call() {
        let store = MemoryRemoteStore::new();
        store.save_update_time("u", TableName::Record, 5).unwrap();

        store.set_offline(true);
        assert!(store.get_update_time("u", TableName::Record).unwrap_err().is_remote());
        assert!(store.get_documents("u", "records").is_err());
        assert!(store
            .write_batch("u", "records", &DocumentBatch::default())
            .is_err());

        store.set_offline(false);
        assert_eq!(store.get_update_time("u", TableName::Record).unwrap(), Some(5));
    }
}
