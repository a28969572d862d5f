//! Remote per-user document store
//!
//! The remote side keeps one document per entity under
//! `user_data/{user}/{collection}/{document}` and one update-time document
//! per table under `user_data/{user}/UpdateTime/{table}`. The `RemoteStore`
//! trait is the seam between the reconciliation layer and a concrete
//! backend.

pub mod directory;
pub mod memory;

pub use directory::DirectoryRemoteStore;
pub use memory::MemoryRemoteStore;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{Entity, TableName};
use crate::sync::EntitiesToSync;

/// Collection holding the per-table update-time documents
pub const UPDATE_TIME_COLLECTION: &str = "UpdateTime";

/// One stored document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// Deletes and upserts applied to one collection as a single batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentBatch {
    pub delete: Vec<String>,
    pub upsert: Vec<Document>,
}

impl DocumentBatch {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.upsert.is_empty()
    }
}

/// Body of an update-time document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimeDocument {
    pub table_name: String,
    pub timestamp: i64,
}

/// Storage backend for the remote side
///
/// A batch is applied whole: deletes first, then upserts.
pub trait RemoteStore: Send + Sync {
    /// Last write time of `table` for `user_id`, `None` if never written
    fn get_update_time(&self, user_id: &str, table: TableName) -> PocketbookResult<Option<i64>>;

    fn save_update_time(
        &self,
        user_id: &str,
        table: TableName,
        timestamp: i64,
    ) -> PocketbookResult<()>;

    /// Every document in a collection, ordered by document id
    fn get_documents(&self, user_id: &str, collection: &str) -> PocketbookResult<Vec<Document>>;

    fn write_batch(
        &self,
        user_id: &str,
        collection: &str,
        batch: &DocumentBatch,
    ) -> PocketbookResult<()>;
}

/// Typed view of one remote collection
pub struct RemoteDataSource<T: Entity> {
    store: Arc<dyn RemoteStore>,
    user_id: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for RemoteDataSource<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            user_id: self.user_id.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> RemoteDataSource<T> {
    pub fn new(store: Arc<dyn RemoteStore>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
            _entity: PhantomData,
        }
    }

    fn collection(&self) -> &'static str {
        T::TABLE.collection_name()
    }

    pub fn get_all(&self) -> PocketbookResult<Vec<T>> {
        self.store
            .get_documents(&self.user_id, self.collection())?
            .into_iter()
            .map(|document| {
                serde_json::from_value(document.data).map_err(|e| {
                    PocketbookError::Remote(format!(
                        "Malformed document {}/{}: {}",
                        self.collection(),
                        document.id,
                        e
                    ))
                })
            })
            .collect()
    }

    pub fn get_update_time(&self) -> PocketbookResult<Option<i64>> {
        self.store.get_update_time(&self.user_id, T::TABLE)
    }

    pub fn save_update_time(&self, timestamp: i64) -> PocketbookResult<()> {
        self.store.save_update_time(&self.user_id, T::TABLE, timestamp)
    }

    pub fn upsert(&self, entities: &[T], timestamp: i64) -> PocketbookResult<()> {
        let batch = DocumentBatch {
            delete: Vec::new(),
            upsert: to_documents(entities)?,
        };
        self.commit(&batch, timestamp)
    }

    pub fn delete_and_upsert(
        &self,
        entities: &EntitiesToSync<T>,
        timestamp: i64,
    ) -> PocketbookResult<()> {
        let batch = DocumentBatch {
            delete: entities.to_delete.iter().map(|e| e.document_id()).collect(),
            upsert: to_documents(&entities.to_upsert)?,
        };
        self.commit(&batch, timestamp)
    }

    pub fn delete_all(&self, timestamp: i64) -> PocketbookResult<()> {
        let existing = self.store.get_documents(&self.user_id, self.collection())?;
        let batch = DocumentBatch {
            delete: existing.into_iter().map(|document| document.id).collect(),
            upsert: Vec::new(),
        };
        self.commit(&batch, timestamp)
    }

    fn commit(&self, batch: &DocumentBatch, timestamp: i64) -> PocketbookResult<()> {
        if !batch.is_empty() {
            self.store
                .write_batch(&self.user_id, self.collection(), batch)?;
        }
        self.save_update_time(timestamp)
    }
}

fn to_documents<T: Entity>(entities: &[T]) -> PocketbookResult<Vec<Document>> {
    entities
        .iter()
        .map(|entity| {
            Ok(Document {
                id: entity.document_id(),
                data: serde_json::to_value(entity)?,
            })
        })
        .collect()
}
