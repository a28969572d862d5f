//! Account CLI commands
//!
//! Implements CLI commands for account management.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::account::{format_account_details, format_account_list};
use crate::error::PocketbookResult;
use crate::services::AccountService;
use crate::sync::Repositories;

use super::{parse_amount, require_account};

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Add {
        /// Account name
        name: String,
        /// Currency code (defaults to the configured currency)
        #[arg(short, long)]
        currency: Option<String>,
        /// Starting balance (e.g., "1000" or "1000.00")
        #[arg(short, long, default_value = "0")]
        balance: String,
    },

    /// List accounts
    List {
        /// Include hidden accounts
        #[arg(short, long)]
        all: bool,
    },

    /// Show account details
    Show {
        /// Account name or ID
        account: String,
    },

    /// Delete an account and its records
    Delete {
        /// Account name or ID
        account: String,
    },
}

/// Handle an account command
pub fn handle_account_command(
    repos: &Repositories,
    settings: &Settings,
    cmd: AccountCommands,
) -> PocketbookResult<()> {
    let service = AccountService::new(repos);

    match cmd {
        AccountCommands::Add {
            name,
            currency,
            balance,
        } => {
            let balance = parse_amount(&balance)?;
            let currency = currency.unwrap_or_else(|| settings.currency.clone());
            let account = service.create(&name, &currency, balance)?;

            println!("Created account: {}", account.name);
            println!("  Balance: {}", account.formatted_balance_with_currency());
            println!("  ID: {}", account.id);
        }

        AccountCommands::List { all } => {
            let accounts = service.list(all)?;
            print!("{}", format_account_list(&accounts));
        }

        AccountCommands::Show { account } => {
            let found = require_account(repos, &account)?;
            print!("{}", format_account_details(&found));
        }

        AccountCommands::Delete { account } => {
            let found = require_account(repos, &account)?;
            let deletion = service.delete(found.id)?;

            println!("Deleted account: {}", found.name);
            if !deletion.removed_records.is_empty() {
                println!("  Removed {} record(s)", deletion.removed_records.len());
            }
            if !deletion.converted_records.is_empty() {
                println!(
                    "  Converted {} transfer record(s) in other accounts",
                    deletion.converted_records.len()
                );
            }
            for budget in &deletion.removed_budgets {
                println!("  Removed budget '{}' (no linked accounts left)", budget.name);
            }
        }
    }

    Ok(())
}
