//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod account;
pub mod budget;
pub mod category;
pub mod record;
pub mod setup;
pub mod widget;

pub use account::{handle_account_command, AccountCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use record::{handle_record_command, RecordCommands};
pub use setup::{
    handle_config_command, handle_history_command, handle_init_command, handle_sync_command,
    ConfigArgs,
};
pub use widget::{handle_widget_command, WidgetCommands};

use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{Account, DateStamp, Money};
use crate::services::AccountService;
use crate::sync::Repositories;

/// Parse a user-entered amount, rejecting negatives
pub(crate) fn parse_amount(input: &str) -> PocketbookResult<Money> {
    let amount = Money::parse(input).map_err(|e| {
        PocketbookError::Validation(format!(
            "Invalid amount: '{}'. Use format like '12.50' or '12'. Error: {}",
            input, e
        ))
    })?;
    if amount.is_negative() {
        return Err(PocketbookError::Validation(format!(
            "Amount must not be negative: {}",
            input
        )));
    }
    Ok(amount)
}

/// Parse an optional date, defaulting to now
pub(crate) fn parse_date(input: Option<&str>) -> PocketbookResult<DateStamp> {
    match input {
        Some(s) => DateStamp::parse(s).map_err(|e| PocketbookError::Validation(e.to_string())),
        None => Ok(DateStamp::now()),
    }
}

pub(crate) fn require_account(repos: &Repositories, identifier: &str) -> PocketbookResult<Account> {
    AccountService::new(repos)
        .find(identifier)?
        .ok_or_else(|| PocketbookError::account_not_found(identifier))
}
