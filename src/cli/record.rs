//! Record CLI commands
//!
//! Implements CLI commands for expenses, income, and transfers. Every
//! mutation goes through `FinanceState` so budget usage is reported right
//! after the change.

use chrono::Local;
use clap::Subcommand;

use crate::display::format::format_percentage;
use crate::display::record::format_record_table;
use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{CategoryType, Money, RecordType};
use crate::services::{
    AccountService, CategoryService, RecordChange, RecordDraft, RecordItem, RecordService,
    TransferDraft,
};
use crate::state::FinanceState;
use crate::sync::Repositories;

use super::category::resolve_category;
use super::{parse_amount, parse_date, require_account};

/// Record subcommands
#[derive(Subcommand)]
pub enum RecordCommands {
    /// Add an expense (or income with --income)
    ///
    /// Each item is "AMOUNT[xQUANTITY][:Category[/Sub]]", e.g. "3.20x2:Food/Cafe".
    /// All items are saved as one stack.
    Add {
        /// Account name or ID
        account: String,
        /// Record items
        #[arg(required = true)]
        items: Vec<String>,
        /// Record income instead of an expense
        #[arg(short, long)]
        income: bool,
        /// Note attached to every item
        #[arg(short, long)]
        note: Option<String>,
        /// Record date (YYYY-MM-DD [HH:MM]), defaults to now
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Move money between two accounts
    Transfer {
        /// Source account name or ID
        from: String,
        /// Destination account name or ID
        to: String,
        /// Amount leaving the source account
        amount: String,
        /// Amount arriving at the destination, when the currencies differ
        #[arg(short, long)]
        received: Option<String>,
        /// Transfer date (YYYY-MM-DD [HH:MM]), defaults to now
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List records, newest first
    List {
        /// Filter by account
        #[arg(short, long)]
        account: Option<String>,
        /// Number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Replace the items of a record stack
    Edit {
        /// Record number
        record_num: i64,
        /// New record items
        #[arg(required = true)]
        items: Vec<String>,
        /// Note attached to every item
        #[arg(short, long)]
        note: Option<String>,
        /// New date, defaults to the stack's current date
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Copy a record stack to a new date
    Repeat {
        /// Record number
        record_num: i64,
        /// Date of the copy, defaults to now
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Delete a record stack
    Delete {
        /// Record number
        record_num: i64,
    },
}

/// Parsed form of "AMOUNT[xQUANTITY][:Category[/Sub]]"
#[derive(Debug, PartialEq)]
struct ItemSpec<'a> {
    amount: Money,
    quantity: Option<u32>,
    category: Option<&'a str>,
}

fn parse_item(input: &str) -> PocketbookResult<ItemSpec<'_>> {
    let (head, category) = match input.split_once(':') {
        Some((head, category)) => (head, Some(category.trim()).filter(|c| !c.is_empty())),
        None => (input, None),
    };
    let (amount, quantity) = match head.split_once(['x', 'X']) {
        Some((amount, quantity)) => {
            let quantity: u32 = quantity.trim().parse().map_err(|_| {
                PocketbookError::Validation(format!("Invalid quantity in '{}'", input))
            })?;
            (amount, Some(quantity))
        }
        None => (head, None),
    };

    Ok(ItemSpec {
        amount: parse_amount(amount)?,
        quantity,
        category,
    })
}

fn build_items(
    repos: &Repositories,
    category_type: CategoryType,
    inputs: &[String],
    note: Option<&str>,
) -> PocketbookResult<Vec<RecordItem>> {
    inputs
        .iter()
        .map(|input| {
            let parsed = parse_item(input)?;
            let mut item = RecordItem::new(parsed.amount);
            if let Some(quantity) = parsed.quantity {
                item = item.with_quantity(quantity);
            }
            if let Some(path) = parsed.category {
                let pair = resolve_category(repos, Some(category_type), path)?;
                item = match pair.subcategory {
                    Some(sub) => item.with_subcategory(pair.category.id, sub.id),
                    None => item.with_category(pair.category.id),
                };
            }
            item.note = note.map(str::to_string);
            Ok(item)
        })
        .collect()
}

fn category_type_of(record_type: RecordType) -> CategoryType {
    match record_type {
        RecordType::Income => CategoryType::Income,
        _ => CategoryType::Expense,
    }
}

fn report_change(state: &FinanceState<'_>, change: &RecordChange) {
    for (account_id, delta) in change.balance_deltas() {
        if delta == Money::zero() {
            continue;
        }
        if let Some(account) = state.accounts.iter().find(|a| a.id == account_id) {
            println!(
                "  {}: {}{} (balance {})",
                account.name,
                if delta.is_negative() { "" } else { "+" },
                delta.format_with_spaces(),
                account.formatted_balance_with_currency()
            );
        }
    }

    for budget in state.budgets.concatenate() {
        if budget.used_amount > budget.amount_limit {
            println!(
                "  Over budget: {} ({} of {}, {})",
                budget.name,
                budget.used_amount.format_with_spaces(),
                budget.amount_limit.format_with_spaces(),
                format_percentage(budget.used_percentage)
            );
        }
    }
}

/// Handle a record command
pub fn handle_record_command(repos: &Repositories, cmd: RecordCommands) -> PocketbookResult<()> {
    let reference = Local::now().naive_local();

    match cmd {
        RecordCommands::Add {
            account,
            items,
            income,
            note,
            date,
        } => {
            let account = require_account(repos, &account)?;
            let record_type = if income {
                RecordType::Income
            } else {
                RecordType::Expense
            };
            let draft = RecordDraft {
                date: parse_date(date.as_deref())?,
                record_type,
                account_id: account.id,
                items: build_items(repos, category_type_of(record_type), &items, note.as_deref())?,
            };

            let mut state = FinanceState::load(repos, reference)?;
            let change = state.save_records(&draft)?;
            let record_num = change.added.first().map(|r| r.record_num).unwrap_or_default();
            println!(
                "Saved record #{} ({} item(s)) to {}",
                record_num,
                change.added.len(),
                account.name
            );
            report_change(&state, &change);
        }

        RecordCommands::Transfer {
            from,
            to,
            amount,
            received,
            date,
        } => {
            let from = require_account(repos, &from)?;
            let to = require_account(repos, &to)?;
            let draft = TransferDraft {
                date: parse_date(date.as_deref())?,
                from_account_id: from.id,
                to_account_id: to.id,
                amount: parse_amount(&amount)?,
                received_amount: received.as_deref().map(parse_amount).transpose()?,
            };

            let mut state = FinanceState::load(repos, reference)?;
            let change = state.save_transfer(&draft)?;
            println!("Transferred {} from {} to {}", draft.amount, from.name, to.name);
            report_change(&state, &change);
        }

        RecordCommands::List { account, limit } => {
            let account_id = account
                .map(|a| require_account(repos, &a).map(|found| found.id))
                .transpose()?;
            let records = RecordService::new(repos).list(account_id, Some(limit))?;
            let accounts = AccountService::new(repos).list(true)?;
            let categories = CategoryService::new(repos).list()?;
            print!("{}", format_record_table(&records, &accounts, &categories));
        }

        RecordCommands::Edit {
            record_num,
            items,
            note,
            date,
        } => {
            let stack = RecordService::new(repos).stack(record_num)?;
            let first = stack
                .first()
                .ok_or_else(|| PocketbookError::record_not_found(format!("#{}", record_num)))?;
            if first.is_transfer() {
                return Err(PocketbookError::Validation(format!(
                    "Record #{} is a transfer; delete it and transfer again",
                    record_num
                )));
            }
            let draft = RecordDraft {
                date: match date {
                    Some(d) => parse_date(Some(&d))?,
                    None => first.date,
                },
                record_type: first.record_type,
                account_id: first.account_id,
                items: build_items(
                    repos,
                    category_type_of(first.record_type),
                    &items,
                    note.as_deref(),
                )?,
            };

            let mut state = FinanceState::load(repos, reference)?;
            let change = state.replace_stack(record_num, &draft)?;
            println!("Updated record #{}", record_num);
            report_change(&state, &change);
        }

        RecordCommands::Repeat { record_num, date } => {
            let mut state = FinanceState::load(repos, reference)?;
            let change = state.repeat(record_num, parse_date(date.as_deref())?)?;
            let new_num = change.added.first().map(|r| r.record_num).unwrap_or_default();
            println!("Repeated record #{} as #{}", record_num, new_num);
            report_change(&state, &change);
        }

        RecordCommands::Delete { record_num } => {
            let mut state = FinanceState::load(repos, reference)?;
            let change = state.delete_stack(record_num)?;
            println!(
                "Deleted record #{} ({} item(s))",
                record_num,
                change.removed.len()
            );
            report_change(&state, &change);
        }
    }

    Ok(())
}
