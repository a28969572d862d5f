//! Storage layer for pocketbook
//!
//! Provides JSON file storage with atomic writes: one file per table plus a
//! shared update-time ledger, with every write recorded in the audit log.

pub mod file_io;
pub mod init;
pub mod local;
pub mod table;
pub mod update_times;

pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use local::LocalDataSource;
pub use table::TableRepository;
pub use update_times::UpdateTimeLedger;

use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::config::paths::PocketbookPaths;
use crate::error::PocketbookResult;
use crate::models::{
    Account, Budget, BudgetOnWidget, Category, CategoryCollection, CollectionCategoryAssociation,
    Entity, NavigationButton, Record, Widget,
};

/// Owner of every local table, the ledger, and the audit log
pub struct LocalStore {
    paths: PocketbookPaths,
    ledger: Arc<UpdateTimeLedger>,
    audit: Arc<AuditLogger>,
    accounts: Arc<TableRepository<Account>>,
    categories: Arc<TableRepository<Category>>,
    category_collections: Arc<TableRepository<CategoryCollection>>,
    collection_categories: Arc<TableRepository<CollectionCategoryAssociation>>,
    records: Arc<TableRepository<Record>>,
    budgets: Arc<TableRepository<Budget>>,
    budgets_on_widgets: Arc<TableRepository<BudgetOnWidget>>,
    widgets: Arc<TableRepository<Widget>>,
    navigation_buttons: Arc<TableRepository<NavigationButton>>,
}

fn table_for<T: Entity>(paths: &PocketbookPaths) -> Arc<TableRepository<T>> {
    Arc::new(TableRepository::new(paths.table_file(T::TABLE)))
}

impl LocalStore {
    /// Create a new LocalStore instance
    pub fn new(paths: PocketbookPaths) -> PocketbookResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            ledger: Arc::new(UpdateTimeLedger::new(paths.update_times_file())),
            audit: Arc::new(AuditLogger::new(paths.audit_log())),
            accounts: table_for(&paths),
            categories: table_for(&paths),
            category_collections: table_for(&paths),
            collection_categories: table_for(&paths),
            records: table_for(&paths),
            budgets: table_for(&paths),
            budgets_on_widgets: table_for(&paths),
            widgets: table_for(&paths),
            navigation_buttons: table_for(&paths),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &PocketbookPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&self) -> PocketbookResult<()> {
        self.ledger.load()?;
        self.accounts.load()?;
        self.categories.load()?;
        self.category_collections.load()?;
        self.collection_categories.load()?;
        self.records.load()?;
        self.budgets.load()?;
        self.budgets_on_widgets.load()?;
        self.widgets.load()?;
        self.navigation_buttons.load()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    fn source<T: Entity>(&self, table: &Arc<TableRepository<T>>) -> LocalDataSource<T> {
        LocalDataSource::new(
            Arc::clone(table),
            Arc::clone(&self.ledger),
            Arc::clone(&self.audit),
        )
    }

    pub fn accounts(&self) -> LocalDataSource<Account> {
        self.source(&self.accounts)
    }

    pub fn categories(&self) -> LocalDataSource<Category> {
        self.source(&self.categories)
    }

    pub fn category_collections(&self) -> LocalDataSource<CategoryCollection> {
        self.source(&self.category_collections)
    }

    pub fn collection_categories(&self) -> LocalDataSource<CollectionCategoryAssociation> {
        self.source(&self.collection_categories)
    }

    pub fn records(&self) -> LocalDataSource<Record> {
        self.source(&self.records)
    }

    pub fn budgets(&self) -> LocalDataSource<Budget> {
        self.source(&self.budgets)
    }

    pub fn budgets_on_widgets(&self) -> LocalDataSource<BudgetOnWidget> {
        self.source(&self.budgets_on_widgets)
    }

    pub fn widgets(&self) -> LocalDataSource<Widget> {
        self.source(&self.widgets)
    }

    pub fn navigation_buttons(&self) -> LocalDataSource<NavigationButton> {
        self.source(&self.navigation_buttons)
    }
}
