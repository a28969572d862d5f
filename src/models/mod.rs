//! Core data models for pocketbook
//!
//! This module contains all the data structures of the ledger: accounts,
//! categories, records, budgets, personalisation data, and the table
//! identities they are persisted under.

pub mod account;
pub mod budget;
pub mod category;
pub mod collection;
pub mod date;
pub mod ids;
pub mod money;
pub mod period;
pub mod personalization;
pub mod record;
pub mod table;

pub use account::{Account, AccountValidationError};
pub use budget::{Budget, BudgetValidationError, BudgetsByPeriod, TotalAmountByRange};
pub use category::{Category, CategoryType, CategoryValidationError, CategoryWithSubcategory};
pub use collection::{
    CategoryCollection, CollectionCategoryAssociation, CollectionType, CollectionWithCategories,
};
pub use date::{DateParseError, DateRange, DateStamp};
pub use ids::{AccountId, BudgetId, CategoryCollectionId, CategoryId, RecordId};
pub use money::{Money, MoneyParseError};
pub use period::RepeatingPeriod;
pub use personalization::{
    BudgetOnWidget, CheckedWidget, NavScreen, NavigationButton, Widget, WidgetName,
};
pub use record::{validate_transfer_pair, Record, RecordType, RecordValidationError};
pub use table::{Entity, TableName};
