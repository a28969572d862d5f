//! Reconciliation of every table
//!
//! Tables are reconciled in dependency order, referenced tables first. The
//! first failure stops the run; tables already reconciled stay reconciled.

use tracing::info;

use crate::error::PocketbookResult;
use crate::models::TableName;
use crate::sync::{Repositories, SyncOutcome};

/// Outcome of reconciling each table, in the order they were reconciled
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub tables: Vec<(TableName, SyncOutcome)>,
}

impl SyncReport {
    /// Tables whose contents changed on either side
    pub fn changed(&self) -> impl Iterator<Item = &(TableName, SyncOutcome)> {
        self.tables.iter().filter(|(_, outcome)| {
            matches!(outcome, SyncOutcome::Pulled(_) | SyncOutcome::Pushed(_))
        })
    }
}

pub struct SyncService<'a> {
    repos: &'a Repositories,
}

impl<'a> SyncService<'a> {
    pub fn new(repos: &'a Repositories) -> Self {
        Self { repos }
    }

    pub fn synchronize_all(&self) -> PocketbookResult<SyncReport> {
        let mut report = SyncReport::default();
        for table in TableName::SYNC_ORDER {
            let outcome = self.repos.synchronize_table(table)?;
            report.tables.push((table, outcome));
        }

        info!(changed = report.changed().count(), "synchronization finished");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PocketbookPaths;
    use crate::models::Account;
    use crate::remote::{MemoryRemoteStore, RemoteStore};
    use crate::storage::{initialize_storage, LocalStore};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_store(temp_dir: &TempDir, name: &str) -> LocalStore {
        let paths = PocketbookPaths::with_base_dir(temp_dir.path().join(name));
        let store = LocalStore::new(paths).unwrap();
        initialize_storage(&store).unwrap();
        store
    }

    #[test]
    fn test_local_only_report() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir, "local");
        let repos = Repositories::local_only(&store);

        let report = SyncService::new(&repos).synchronize_all().unwrap();
        assert_eq!(report.tables.len(), 9);
        assert!(report
            .tables
            .iter()
            .all(|(_, outcome)| *outcome == SyncOutcome::LocalOnly));
    }

    #[test]
    fn test_new_device_pulls_before_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let remote = Arc::new(MemoryRemoteStore::new());
        let first = Repositories::new(
            &create_store(&temp_dir, "first"),
            Some((remote.clone(), "alice".into())),
        );
        SyncService::new(&first).synchronize_all().unwrap();
        first.accounts.upsert(&[Account::new("Cash", "USD")]).unwrap();

        let second_store =
            LocalStore::new(PocketbookPaths::with_base_dir(temp_dir.path().join("second")))
                .unwrap();
        let second = Repositories::new(&second_store, Some((remote.clone(), "alice".into())));
        let report = SyncService::new(&second).synchronize_all().unwrap();
        initialize_storage(&second_store).unwrap();

        assert!(report
            .tables
            .contains(&(TableName::Account, SyncOutcome::Pulled(1))));
        assert!(report
            .tables
            .contains(&(TableName::Widget, SyncOutcome::Pulled(4))));
        assert_eq!(
            second.accounts.get_all().unwrap(),
            first.accounts.get_all().unwrap()
        );
        assert_eq!(
            second.categories.get_all().unwrap(),
            first.categories.get_all().unwrap()
        );
        assert_eq!(
            SyncService::new(&second).synchronize_all().unwrap().changed().count(),
            0
        );
    }

    #[test]
    fn test_aborts_on_remote_failure() {
        let temp_dir = TempDir::new().unwrap();
        let remote = Arc::new(MemoryRemoteStore::new());
        let repos = Repositories::new(
            &create_store(&temp_dir, "local"),
            Some((remote.clone(), "alice".into())),
        );

        remote.set_offline(true);
        assert!(SyncService::new(&repos).synchronize_all().unwrap_err().is_remote());

        remote.set_offline(false);
        assert_eq!(remote.get_update_time("alice", TableName::Account).unwrap(), None);
    }
}
