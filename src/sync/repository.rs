//! Per-table repository over a local source and an optional remote source
//!
//! Writes go to both sides under one timestamp. Reconciliation compares the
//! two update times and lets the strictly newer side replace the other one
//! wholesale (last write wins). A side with no update time was never written
//! and loses to any stamped side; when neither side is stamped, local seed
//! data is published under a fresh timestamp.

use std::fmt;

use chrono::Utc;
use tracing::{debug, info};

use crate::audit::{AuditEntry, Operation};
use crate::error::PocketbookResult;
use crate::models::Entity;
use crate::remote::RemoteDataSource;
use crate::storage::LocalDataSource;

use super::entities::EntitiesToSync;

/// Result of reconciling one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Local table replaced by this many remote entities
    Pulled(usize),
    /// Remote table replaced by this many local entities
    Pushed(usize),
    UpToDate,
    /// No remote store configured
    LocalOnly,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pulled(n) => write!(f, "pulled {}", n),
            Self::Pushed(n) => write!(f, "pushed {}", n),
            Self::UpToDate => write!(f, "up to date"),
            Self::LocalOnly => write!(f, "local only"),
        }
    }
}

/// Epoch milliseconds used to stamp one write on both sides
pub fn current_timestamp() -> i64 {
    Utc::now().timestamp_millis()
}

pub struct SyncRepository<T: Entity> {
    local: LocalDataSource<T>,
    remote: Option<RemoteDataSource<T>>,
}

impl<T: Entity> SyncRepository<T> {
    pub fn new(local: LocalDataSource<T>, remote: Option<RemoteDataSource<T>>) -> Self {
        Self { local, remote }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn get_all(&self) -> PocketbookResult<Vec<T>> {
        self.local.get_all()
    }

    pub fn get(&self, key: &T::Key) -> PocketbookResult<Option<T>> {
        self.local.get(key)
    }

    pub fn upsert(&self, entities: &[T]) -> PocketbookResult<()> {
        let timestamp = current_timestamp();
        if let Some(remote) = &self.remote {
            remote.upsert(entities, timestamp)?;
        }
        self.local.upsert(entities, timestamp)
    }

    pub fn delete_and_upsert(&self, entities: &EntitiesToSync<T>) -> PocketbookResult<()> {
        let timestamp = current_timestamp();
        if let Some(remote) = &self.remote {
            remote.delete_and_upsert(entities, timestamp)?;
        }
        self.local.delete_and_upsert(entities, timestamp)
    }

    pub fn delete_all(&self) -> PocketbookResult<()> {
        let timestamp = current_timestamp();
        if let Some(remote) = &self.remote {
            remote.delete_all(timestamp)?;
        }
        self.local.delete_all(timestamp)
    }

    /// Reconcile the local table with the remote one
    pub fn synchronize(&self) -> PocketbookResult<SyncOutcome> {
        let Some(remote) = &self.remote else {
            return Ok(SyncOutcome::LocalOnly);
        };

        let local_time = self.local.get_update_time()?;
        let remote_time = remote.get_update_time()?;
        debug!(table = %T::TABLE, ?local_time, ?remote_time, "comparing update times");

        match (local_time, remote_time) {
            (Some(local), Some(remote_ts)) if local == remote_ts => Ok(SyncOutcome::UpToDate),
            (None, None) => self.publish_unstamped(remote),
            (Some(local), Some(remote_ts)) if local < remote_ts => self.pull(remote, remote_ts),
            (None, Some(remote_ts)) => self.pull(remote, remote_ts),
            (Some(local), _) => self.push(remote, local),
        }
    }

    /// Stamp unwritten local seed data on both sides
    fn publish_unstamped(&self, remote: &RemoteDataSource<T>) -> PocketbookResult<SyncOutcome> {
        if self.local.get_all()?.is_empty() {
            return Ok(SyncOutcome::UpToDate);
        }
        let timestamp = current_timestamp();
        let outcome = self.push(remote, timestamp)?;
        self.local.save_update_time(timestamp)?;
        Ok(outcome)
    }

    fn pull(
        &self,
        remote: &RemoteDataSource<T>,
        remote_time: i64,
    ) -> PocketbookResult<SyncOutcome> {
        let incoming = remote.get_all()?;
        let current = self.local.get_all()?;
        let count = incoming.len();

        self.local
            .delete_and_upsert(&EntitiesToSync::replace_all(current, incoming), remote_time)?;

        info!(table = %T::TABLE, count, "pulled remote table");
        self.local.audit().log(&AuditEntry::reconciled(
            T::TABLE,
            Operation::Pull,
            format!("{} entities at {}", count, remote_time),
        ))?;
        Ok(SyncOutcome::Pulled(count))
    }

    fn push(&self, remote: &RemoteDataSource<T>, local_time: i64) -> PocketbookResult<SyncOutcome> {
        let outgoing = self.local.get_all()?;
        let current = remote.get_all()?;
        let count = outgoing.len();

        remote.delete_and_upsert(&EntitiesToSync::replace_all(current, outgoing), local_time)?;

        info!(table = %T::TABLE, count, "pushed local table");
        self.local.audit().log(&AuditEntry::reconciled(
            T::TABLE,
            Operation::Push,
            format!("{} entities at {}", count, local_time),
        ))?;
        Ok(SyncOutcome::Pushed(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PocketbookPaths;
    use crate::models::Account;
    use crate::remote::MemoryRemoteStore;
    use crate::storage::LocalStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        store: LocalStore,
        remote: Arc<MemoryRemoteStore>,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let paths = PocketbookPaths::with_base_dir(temp_dir.path().to_path_buf());
            Self {
                store: LocalStore::new(paths).unwrap(),
                remote: Arc::new(MemoryRemoteStore::new()),
                _temp_dir: temp_dir,
            }
        }

        fn remote_source(&self) -> RemoteDataSource<Account> {
            RemoteDataSource::new(self.remote.clone(), "user")
        }

        fn repository(&self) -> SyncRepository<Account> {
            SyncRepository::new(self.store.accounts(), Some(self.remote_source()))
        }
    }

    #[test]
    fn test_local_only() {
        let fixture = Fixture::new();
        let repo = SyncRepository::new(fixture.store.accounts(), None);
        repo.upsert(&[Account::new("Cash", "USD")]).unwrap();
        assert_eq!(repo.synchronize().unwrap(), SyncOutcome::LocalOnly);
        assert!(!repo.has_remote());
    }

    #[test]
    fn test_writes_reach_both_sides_with_one_timestamp() {
        let fixture = Fixture::new();
        let repo = fixture.repository();
        let account = Account::new("Cash", "USD");

        repo.upsert(std::slice::from_ref(&account)).unwrap();

        let local_time = fixture.store.accounts().get_update_time().unwrap();
        let remote_time = fixture.remote_source().get_update_time().unwrap();
        assert!(local_time.is_some());
        assert_eq!(local_time, remote_time);
        assert_eq!(fixture.remote_source().get_all().unwrap(), vec![account]);
        assert_eq!(repo.synchronize().unwrap(), SyncOutcome::UpToDate);
    }

    #[test]
    fn test_newer_local_pushes() {
        let fixture = Fixture::new();
        let local_account = Account::new("Local", "USD");
        let remote_account = Account::new("Remote", "USD");
        fixture
            .store
            .accounts()
            .upsert(std::slice::from_ref(&local_account), 100)
            .unwrap();
        fixture
            .remote_source()
            .upsert(std::slice::from_ref(&remote_account), 50)
            .unwrap();

        let outcome = fixture.repository().synchronize().unwrap();

        assert_eq!(outcome, SyncOutcome::Pushed(1));
        assert_eq!(fixture.remote_source().get_all().unwrap(), vec![local_account]);
        assert_eq!(fixture.remote_source().get_update_time().unwrap(), Some(100));
        assert_eq!(fixture.store.accounts().get_update_time().unwrap(), Some(100));
    }

    #[test]
    fn test_newer_remote_pulls() {
        let fixture = Fixture::new();
        let local_account = Account::new("Local", "USD");
        let remote_account = Account::new("Remote", "USD");
        fixture
            .store
            .accounts()
            .upsert(std::slice::from_ref(&local_account), 10)
            .unwrap();
        fixture
            .remote_source()
            .upsert(std::slice::from_ref(&remote_account), 20)
            .unwrap();

        let outcome = fixture.repository().synchronize().unwrap();

        assert_eq!(outcome, SyncOutcome::Pulled(1));
        assert_eq!(fixture.store.accounts().get_all().unwrap(), vec![remote_account]);
        assert_eq!(fixture.store.accounts().get_update_time().unwrap(), Some(20));
        assert_eq!(fixture.remote_source().get_update_time().unwrap(), Some(20));
    }

    #[test]
    fn test_never_written_remote_receives_local() {
        let fixture = Fixture::new();
        fixture
            .store
            .accounts()
            .upsert(&[Account::new("A", "USD")], 0)
            .unwrap();

        let outcome = fixture.repository().synchronize().unwrap();
        assert_eq!(outcome, SyncOutcome::Pushed(1));
        assert_eq!(fixture.remote_source().get_update_time().unwrap(), Some(0));
    }

    #[test]
    fn test_seeded_local_yields_to_stamped_remote() {
        let fixture = Fixture::new();
        fixture.store.accounts().seed(&[Account::new("Seed", "USD")]).unwrap();
        let remote_account = Account::new("Remote", "USD");
        fixture
            .remote_source()
            .upsert(std::slice::from_ref(&remote_account), 0)
            .unwrap();

        assert_eq!(fixture.repository().synchronize().unwrap(), SyncOutcome::Pulled(1));
        assert_eq!(fixture.store.accounts().get_all().unwrap(), vec![remote_account]);
        assert_eq!(fixture.store.accounts().get_update_time().unwrap(), Some(0));
    }

    #[test]
    fn test_seed_published_when_neither_side_written() {
        let fixture = Fixture::new();
        let repo = fixture.repository();
        assert_eq!(repo.synchronize().unwrap(), SyncOutcome::UpToDate);

        let seed = Account::new("Seed", "USD");
        fixture.store.accounts().seed(std::slice::from_ref(&seed)).unwrap();

        assert_eq!(repo.synchronize().unwrap(), SyncOutcome::Pushed(1));
        assert_eq!(fixture.remote_source().get_all().unwrap(), vec![seed]);
        let local_time = fixture.store.accounts().get_update_time().unwrap();
        assert!(local_time.is_some());
        assert_eq!(local_time, fixture.remote_source().get_update_time().unwrap());
        assert_eq!(repo.synchronize().unwrap(), SyncOutcome::UpToDate);
    }

    #[test]
    fn test_second_synchronize_is_noop() {
        let fixture = Fixture::new();
        fixture
            .remote_source()
            .upsert(&[Account::new("A", "USD")], 5)
            .unwrap();
        let repo = fixture.repository();

        assert_eq!(repo.synchronize().unwrap(), SyncOutcome::Pulled(1));
        let writes = fixture.remote.write_count();
        assert_eq!(repo.synchronize().unwrap(), SyncOutcome::UpToDate);
        assert_eq!(fixture.remote.write_count(), writes);
    }

    #[test]
    fn test_remote_failure_leaves_local_untouched() {
        let fixture = Fixture::new();
        let repo = fixture.repository();
        let account = Account::new("Cash", "USD");
        repo.upsert(std::slice::from_ref(&account)).unwrap();
        let before = fixture.store.accounts().get_update_time().unwrap();

        fixture.remote.set_offline(true);
        let err = repo.upsert(&[Account::new("Card", "USD")]).unwrap_err();
        assert!(err.is_remote());
        assert_eq!(repo.get_all().unwrap(), vec![account]);
        assert_eq!(fixture.store.accounts().get_update_time().unwrap(), before);

        assert!(repo.synchronize().unwrap_err().is_remote());
    }
}
