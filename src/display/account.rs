//! Account display formatting
//!
//! Formats accounts for terminal output in table and detail views.

use std::collections::BTreeMap;

use crate::models::{Account, Money};

/// Format a list of accounts as a table with per-currency totals
pub fn format_account_list(accounts: &[Account]) -> String {
    if accounts.is_empty() {
        return "No accounts found.".to_string();
    }

    let name_width = accounts
        .iter()
        .map(|a| a.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<8}  {:>16}  {}\n",
        "Name",
        "Currency",
        "Balance",
        "Status",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<8}  {:->16}  {:-<10}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for account in accounts {
        let status = if account.hide {
            "Hidden"
        } else if account.without_balance {
            "No balance"
        } else {
            ""
        };

        output.push_str(&format!(
            "{:<name_width$}  {:<8}  {:>16}  {}\n",
            account.name,
            account.currency,
            account.formatted_balance(),
            status,
            name_width = name_width,
        ));
    }

    let mut totals: BTreeMap<&str, Money> = BTreeMap::new();
    for account in accounts.iter().filter(|a| !a.without_balance) {
        *totals.entry(account.currency.as_str()).or_default() += account.balance;
    }

    output.push_str(&format!(
        "{:-<name_width$}  {:-<8}  {:->16}  {:-<10}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));
    for (currency, total) in totals {
        output.push_str(&format!(
            "{:<name_width$}  {:<8}  {:>16}\n",
            "TOTAL",
            currency,
            total.format_with_spaces(),
            name_width = name_width,
        ));
    }

    output
}

/// Format a single account's details
pub fn format_account_details(account: &Account) -> String {
    let mut output = String::new();

    output.push_str(&format!("Account: {}\n", account.name));
    output.push_str(&format!("  ID:       {}\n", account.id));
    output.push_str(&format!(
        "  Balance:  {}\n",
        account.formatted_balance_with_currency()
    ));
    output.push_str(&format!("  Color:    {}\n", account.color));
    output.push_str(&format!(
        "  Hidden:   {}\n",
        if account.hide { "Yes" } else { "No" }
    ));

    output
}
