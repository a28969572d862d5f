//! Budget CLI commands
//!
//! Implements CLI commands for budget management: creating budgets,
//! showing usage for the current ranges, and per-range statistics.

use chrono::{Local, NaiveDateTime};
use clap::Subcommand;

use crate::display::budget::{format_budget_statistics, format_budget_table};
use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{Budget, CategoryType, DateStamp, RepeatingPeriod};
use crate::services::{AccountService, BudgetDraft, BudgetService};
use crate::sync::Repositories;

use super::category::resolve_category;
use super::{parse_amount, require_account};

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Create a budget
    Add {
        /// Budget name
        name: String,
        /// Spending limit per period (e.g., "400" or "400.00")
        limit: String,
        /// Repeating period ("daily", "weekly", "monthly", "yearly")
        #[arg(short, long, default_value = "monthly")]
        period: String,
        /// Only count one expense category ("Name" or "Parent/Sub")
        #[arg(short, long)]
        category: Option<String>,
        /// Linked account; repeat for several, defaults to every account
        #[arg(short, long = "account")]
        accounts: Vec<String>,
    },

    /// Show budgets with their usage in the current ranges
    List {
        /// Reference date (YYYY-MM-DD [HH:MM]), defaults to now
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Delete a budget
    Delete {
        /// Budget name or ID
        budget: String,
    },

    /// Show a budget's usage over its last ranges
    Stats {
        /// Budget name or ID
        budget: String,
        /// Number of ranges to show
        #[arg(short, long, default_value = "6")]
        count: usize,
        /// Reference date (YYYY-MM-DD [HH:MM]), defaults to now
        #[arg(short, long)]
        date: Option<String>,
    },
}

fn parse_period(input: &str) -> PocketbookResult<RepeatingPeriod> {
    RepeatingPeriod::parse(input).ok_or_else(|| {
        PocketbookError::Validation(format!(
            "Invalid period: '{}'. Valid periods: daily, weekly, monthly, yearly",
            input
        ))
    })
}

fn parse_reference(input: Option<&str>) -> PocketbookResult<NaiveDateTime> {
    match input {
        Some(s) => DateStamp::parse(s)
            .ok()
            .and_then(|date| date.to_datetime())
            .ok_or_else(|| PocketbookError::Validation(format!("Invalid date: {}", s))),
        None => Ok(Local::now().naive_local()),
    }
}

fn require_budget(service: &BudgetService<'_>, identifier: &str) -> PocketbookResult<Budget> {
    service
        .find(identifier)?
        .ok_or_else(|| PocketbookError::budget_not_found(identifier))
}

/// Handle a budget command
pub fn handle_budget_command(repos: &Repositories, cmd: BudgetCommands) -> PocketbookResult<()> {
    let service = BudgetService::new(repos);

    match cmd {
        BudgetCommands::Add {
            name,
            limit,
            period,
            category,
            accounts,
        } => {
            let linked_account_ids = if accounts.is_empty() {
                AccountService::new(repos)
                    .list(true)?
                    .into_iter()
                    .map(|account| account.id)
                    .collect()
            } else {
                accounts
                    .iter()
                    .map(|a| require_account(repos, a).map(|found| found.id))
                    .collect::<PocketbookResult<Vec<_>>>()?
            };
            let category_id = category
                .map(|path| {
                    resolve_category(repos, Some(CategoryType::Expense), &path)
                        .map(|pair| pair.subcategory_or_category().id)
                })
                .transpose()?;

            let budget = service.create(BudgetDraft {
                name,
                amount_limit: parse_amount(&limit)?,
                repeating_period: parse_period(&period)?,
                category_id,
                linked_account_ids,
            })?;

            println!("Created budget: {}", budget.name);
            println!("  Limit: {} {}", budget.amount_limit, budget.repeating_period);
            println!("  Accounts: {}", budget.linked_account_ids.len());
        }

        BudgetCommands::List { date } => {
            let reference = parse_reference(date.as_deref())?;
            let budgets = service.budgets_by_period(reference)?;
            print!("{}", format_budget_table(&budgets));
        }

        BudgetCommands::Delete { budget } => {
            let found = require_budget(&service, &budget)?;
            service.delete(found.id)?;
            println!("Deleted budget: {}", found.name);
        }

        BudgetCommands::Stats {
            budget,
            count,
            date,
        } => {
            if count == 0 {
                return Err(PocketbookError::Validation(
                    "Count must be at least 1".into(),
                ));
            }
            let found = require_budget(&service, &budget)?;
            let reference = parse_reference(date.as_deref())?;
            let totals = service.statistics(found.id, reference, count)?;
            print!("{}", format_budget_statistics(&found, &totals));
        }
    }

    Ok(())
}
