//! Display formatting for terminal output
//!
//! Provides utilities for formatting data models for terminal display:
//! plain-text lists and trees, and `tabled` tables for records and budgets.

pub mod account;
pub mod budget;
pub mod category;
pub mod format;
pub mod personalization;
pub mod record;
pub mod sync;

pub use account::{format_account_details, format_account_list};
pub use budget::{format_budget_statistics, format_budget_table};
pub use category::{format_category_tree, format_collection_list};
pub use personalization::{format_navigation_bar, format_widget_list};
pub use record::format_record_table;
pub use sync::format_sync_report;
