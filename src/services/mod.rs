//! Service layer for pocketbook
//!
//! The service layer provides business logic on top of the repositories,
//! handling validation, derived fields, and cross-table operations.

pub mod account;
pub mod budget;
pub mod category;
pub mod collection;
pub mod personalization;
pub mod record;
pub mod sync;

pub use account::{AccountDeletion, AccountService};
pub use budget::{BudgetDraft, BudgetService};
pub use category::CategoryService;
pub use collection::CategoryCollectionService;
pub use personalization::PersonalizationService;
pub use record::{RecordChange, RecordDraft, RecordItem, RecordService, TransferDraft};
pub use sync::{SyncReport, SyncService};
