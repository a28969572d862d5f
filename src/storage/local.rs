//! Local data source for one table
//!
//! Combines a table repository with the shared update-time ledger and the
//! audit log. Every write persists the table, stamps the ledger, and records
//! the change history, in that order.

use std::sync::Arc;

use tracing::debug;

use crate::audit::{AuditEntry, AuditLogger};
use crate::error::PocketbookResult;
use crate::models::Entity;
use crate::sync::EntitiesToSync;

use super::table::TableRepository;
use super::update_times::UpdateTimeLedger;

pub struct LocalDataSource<T: Entity> {
    table: Arc<TableRepository<T>>,
    ledger: Arc<UpdateTimeLedger>,
    audit: Arc<AuditLogger>,
}

impl<T: Entity> Clone for LocalDataSource<T> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            ledger: Arc::clone(&self.ledger),
            audit: Arc::clone(&self.audit),
        }
    }
}

impl<T: Entity> LocalDataSource<T> {
    pub fn new(
        table: Arc<TableRepository<T>>,
        ledger: Arc<UpdateTimeLedger>,
        audit: Arc<AuditLogger>,
    ) -> Self {
        Self {
            table,
            ledger,
            audit,
        }
    }

    pub fn get_all(&self) -> PocketbookResult<Vec<T>> {
        self.table.get_all()
    }

    pub fn get(&self, key: &T::Key) -> PocketbookResult<Option<T>> {
        self.table.get(key)
    }

    pub fn get_update_time(&self) -> PocketbookResult<Option<i64>> {
        self.ledger.get(T::TABLE)
    }

    pub fn save_update_time(&self, timestamp: i64) -> PocketbookResult<()> {
        self.ledger.set(T::TABLE, timestamp)
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Insert or replace `entities`
    pub fn upsert(&self, entities: &[T], timestamp: i64) -> PocketbookResult<()> {
        self.table.upsert_many(entities)?;
        self.commit(&[], entities, Some(timestamp))
    }

    /// Insert first-run defaults without stamping the ledger
    ///
    /// The table still reads as never written, so any remote copy of it wins
    /// the next reconciliation.
    pub fn seed(&self, entities: &[T]) -> PocketbookResult<()> {
        self.table.upsert_many(entities)?;
        self.commit(&[], entities, None)
    }

    /// Apply a delete set and an upsert set as one write
    pub fn delete_and_upsert(
        &self,
        entities: &EntitiesToSync<T>,
        timestamp: i64,
    ) -> PocketbookResult<()> {
        let deleted = self.table.delete_many(&entities.to_delete)?;
        self.table.upsert_many(&entities.to_upsert)?;
        self.commit(&deleted, &entities.to_upsert, Some(timestamp))
    }

    /// Remove every entity in the table
    pub fn delete_all(&self, timestamp: i64) -> PocketbookResult<()> {
        let deleted = self.table.delete_all()?;
        self.commit(&deleted, &[], Some(timestamp))
    }

    fn commit(
        &self,
        deleted: &[T],
        upserted: &[T],
        timestamp: Option<i64>,
    ) -> PocketbookResult<()> {
        self.table.save()?;
        if let Some(timestamp) = timestamp {
            self.ledger.set(T::TABLE, timestamp)?;
        }

        debug!(
            table = %T::TABLE,
            deleted = deleted.len(),
            upserted = upserted.len(),
            ?timestamp,
            "local write committed"
        );

        let entries: Vec<AuditEntry> = deleted
            .iter()
            .map(|entity| AuditEntry::delete(T::TABLE, entity.document_id(), entity))
            .chain(
                upserted
                    .iter()
                    .map(|entity| AuditEntry::upsert(T::TABLE, entity.document_id(), entity)),
            )
            .collect();
        self.audit.log_batch(&entries)
    }
}
