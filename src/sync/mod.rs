//! Local/remote reconciliation
//!
//! Every table is reached through a [`SyncRepository`], which writes to the
//! local store and (when configured) the remote store under one timestamp,
//! and reconciles the two sides with a last-write-wins rule.

pub mod entities;
pub mod repository;

pub use entities::EntitiesToSync;
pub use repository::{current_timestamp, SyncOutcome, SyncRepository};

use std::sync::Arc;

use tracing::debug;

use crate::config::Settings;
use crate::error::PocketbookResult;
use crate::models::{
    Account, Budget, BudgetOnWidget, Category, CategoryCollection, CollectionCategoryAssociation,
    Entity, NavigationButton, Record, TableName, Widget,
};
use crate::remote::{DirectoryRemoteStore, RemoteDataSource, RemoteStore};
use crate::storage::{LocalDataSource, LocalStore};

/// One repository per table, built from a local store and an optional remote
pub struct Repositories {
    pub accounts: SyncRepository<Account>,
    pub categories: SyncRepository<Category>,
    pub category_collections: SyncRepository<CategoryCollection>,
    pub collection_categories: SyncRepository<CollectionCategoryAssociation>,
    pub records: SyncRepository<Record>,
    pub budgets: SyncRepository<Budget>,
    pub budgets_on_widgets: SyncRepository<BudgetOnWidget>,
    pub widgets: SyncRepository<Widget>,
    pub navigation_buttons: SyncRepository<NavigationButton>,
}

fn repository<T: Entity>(
    local: LocalDataSource<T>,
    remote: Option<&(Arc<dyn RemoteStore>, String)>,
) -> SyncRepository<T> {
    let remote =
        remote.map(|(store, user_id)| RemoteDataSource::new(Arc::clone(store), user_id.clone()));
    SyncRepository::new(local, remote)
}

impl Repositories {
    /// Wire every table to `store`, and to `remote` for the given user when present
    pub fn new(store: &LocalStore, remote: Option<(Arc<dyn RemoteStore>, String)>) -> Self {
        let remote = remote.as_ref();
        Self {
            accounts: repository(store.accounts(), remote),
            categories: repository(store.categories(), remote),
            category_collections: repository(store.category_collections(), remote),
            collection_categories: repository(store.collection_categories(), remote),
            records: repository(store.records(), remote),
            budgets: repository(store.budgets(), remote),
            budgets_on_widgets: repository(store.budgets_on_widgets(), remote),
            widgets: repository(store.widgets(), remote),
            navigation_buttons: repository(store.navigation_buttons(), remote),
        }
    }

    pub fn local_only(store: &LocalStore) -> Self {
        Self::new(store, None)
    }

    /// Use the directory remote store named in `settings` if the user is signed in
    pub fn from_settings(store: &LocalStore, settings: &Settings) -> Self {
        let remote = match (&settings.user_id, &settings.remote_dir) {
            (Some(user_id), Some(remote_dir)) => {
                debug!(
                    user_id = %user_id,
                    remote_dir = %remote_dir.display(),
                    "remote store enabled"
                );
                let backend: Arc<dyn RemoteStore> = Arc::new(DirectoryRemoteStore::new(remote_dir));
                Some((backend, user_id.clone()))
            }
            _ => None,
        };
        Self::new(store, remote)
    }

    pub fn has_remote(&self) -> bool {
        self.accounts.has_remote()
    }

    /// Reconcile a single table
    pub fn synchronize_table(&self, table: TableName) -> PocketbookResult<SyncOutcome> {
        match table {
            TableName::Account => self.accounts.synchronize(),
            TableName::Category => self.categories.synchronize(),
            TableName::CategoryCollection => self.category_collections.synchronize(),
            TableName::CategoryCollectionCategoryAssociation => {
                self.collection_categories.synchronize()
            }
            TableName::Record => self.records.synchronize(),
            TableName::Budget => self.budgets.synchronize(),
            TableName::BudgetOnWidget => self.budgets_on_widgets.synchronize(),
            TableName::Widget => self.widgets.synchronize(),
            TableName::NavigationButton => self.navigation_buttons.synchronize(),
        }
    }
}
