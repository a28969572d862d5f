//! Record display formatting
//!
//! Renders the record register as a table, one row per record, with account
//! and category names resolved.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Account, AccountId, Category, CategoryId, Record, RecordType};

use super::format::truncate;

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "#")]
    record_num: i64,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Type")]
    record_type: char,
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Note")]
    note: String,
}

fn account_name(accounts: &[Account], id: AccountId) -> String {
    accounts
        .iter()
        .find(|a| a.id == id)
        .map(|a| a.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn category_name(categories: &[Category], id: Option<CategoryId>) -> String {
    id.and_then(|id| categories.iter().find(|c| c.id == id))
        .map(|c| c.name.clone())
        .unwrap_or_default()
}

fn describe_note(record: &Record, accounts: &[Account]) -> String {
    if record.is_transfer() {
        let arrow = match record.record_type {
            RecordType::OutTransfer => "to",
            _ => "from",
        };
        return match record.counterpart_account_id() {
            Some(id) => format!("{} {}", arrow, account_name(accounts, id)),
            None => format!("{} (deleted account)", arrow),
        };
    }
    record.note.clone().unwrap_or_default()
}

/// Format records as a register table
pub fn format_record_table(
    records: &[Record],
    accounts: &[Account],
    categories: &[Category],
) -> String {
    if records.is_empty() {
        return "No records found.\n".to_string();
    }

    let rows = records.iter().map(|record| {
        let category = match record.subcategory_id {
            Some(_) => format!(
                "{} / {}",
                category_name(categories, record.category_id),
                category_name(categories, record.subcategory_id)
            ),
            None => category_name(categories, record.category_id),
        };
        let amount = match record.quantity {
            Some(quantity) if quantity > 1 => {
                format!("{} (x{})", record.signed_amount().format_with_spaces(), quantity)
            }
            _ => record.signed_amount().format_with_spaces(),
        };

        RecordRow {
            record_num: record.record_num,
            date: record.date.to_string(),
            record_type: record.record_type.as_char(),
            account: truncate(&account_name(accounts, record.account_id), 20),
            amount,
            category: truncate(&category, 30),
            note: truncate(&describe_note(record, accounts), 30),
        }
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryType, DateStamp, Money};

    #[test]
    fn test_format_record_table() {
        let cash = Account::new("Cash", "USD");
        let card = Account::new("Card", "USD");
        let food = Category::new("Food", CategoryType::Expense);
        let date = DateStamp::parse("2024-03-15 09:30").unwrap();

        let mut expense = Record::new(1, date, RecordType::Expense, cash.id, Money::from_units(12));
        expense.category_id = Some(food.id);
        expense.quantity = Some(3);
        let mut out = Record::new(2, date, RecordType::OutTransfer, cash.id, Money::from_units(50));
        out.note = Some(card.id.to_full_string());

        let output = format_record_table(&[expense, out], &[cash, card], &[food]);
        assert!(output.contains("Food"));
        assert!(output.contains("-12.00 (x3)"));
        assert!(output.contains("to Card"));
        assert!(output.contains("Amount"));
    }

    #[test]
    fn test_unpaired_transfer() {
        let cash = Account::new("Cash", "USD");
        let date = DateStamp::parse("2024-03-15").unwrap();
        let record = Record::new(1, date, RecordType::InTransfer, cash.id, Money::from_units(5));

        let output = format_record_table(&[record], &[cash], &[]);
        assert!(output.contains("from (deleted account)"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(format_record_table(&[], &[], &[]), "No records found.\n");
    }
}
