//! Account model
//!
//! Represents wallets, cards, and other places money is held. The balance is
//! kept on the account and moved by record mutations.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::AccountId;
use super::money::Money;
use super::table::{Entity, TableName};

const HIDDEN_BALANCE: &str = "***";

/// A financial account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,

    /// Sort order for display
    #[serde(default)]
    pub order_num: i32,

    /// Account name (e.g., "Main card")
    pub name: String,

    /// ISO currency code
    pub currency: String,

    /// Current balance
    pub balance: Money,

    /// Display color name
    #[serde(default = "default_color")]
    pub color: String,

    /// Hidden from account pickers
    #[serde(default)]
    pub hide: bool,

    /// Balance masked in the UI
    #[serde(default)]
    pub hide_balance: bool,

    /// Account does not track a balance at all
    #[serde(default)]
    pub without_balance: bool,

    /// Currently selected account
    #[serde(default)]
    pub is_active: bool,
}

fn default_color() -> String {
    "Default".to_string()
}

impl Account {
    /// Create a new account with default values
    pub fn new(name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            id: AccountId::new(),
            order_num: 0,
            name: name.into(),
            currency: currency.into(),
            balance: Money::zero(),
            color: default_color(),
            hide: false,
            hide_balance: false,
            without_balance: false,
            is_active: false,
        }
    }

    /// Create a new account with an opening balance
    pub fn with_balance(
        name: impl Into<String>,
        currency: impl Into<String>,
        balance: Money,
    ) -> Self {
        let mut account = Self::new(name, currency);
        account.balance = balance;
        account
    }

    fn balance_is_masked(&self) -> bool {
        self.hide_balance || self.without_balance
    }

    /// Balance with thousands separated by spaces, "***" when masked
    pub fn formatted_balance(&self) -> String {
        if self.balance_is_masked() {
            return HIDDEN_BALANCE.to_string();
        }
        self.balance.format_with_spaces()
    }

    pub fn formatted_balance_with_currency(&self) -> String {
        if self.balance_is_masked() {
            return HIDDEN_BALANCE.to_string();
        }
        format!("{} {}", self.balance.format_with_spaces(), self.currency)
    }

    /// Integer part of the formatted balance; empty for balance-less accounts
    pub fn formatted_balance_before_decimal(&self) -> String {
        if self.hide_balance {
            return HIDDEN_BALANCE.to_string();
        }
        if self.without_balance {
            return String::new();
        }
        let formatted = self.balance.format_with_spaces();
        formatted[..formatted.len() - 3].to_string()
    }

    /// Decimal part of the formatted balance including the separator
    pub fn formatted_balance_after_decimal(&self) -> String {
        if self.balance_is_masked() {
            return String::new();
        }
        let formatted = self.balance.format_with_spaces();
        formatted[formatted.len() - 3..].to_string()
    }

    /// Validate the account
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.name.trim().is_empty() {
            return Err(AccountValidationError::EmptyName);
        }

        if self.name.len() > 100 {
            return Err(AccountValidationError::NameTooLong(self.name.len()));
        }

        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(AccountValidationError::InvalidCurrency(self.currency.clone()));
        }

        Ok(())
    }
}

impl Entity for Account {
    type Key = AccountId;

    const TABLE: TableName = TableName::Account;

    fn key(&self) -> AccountId {
        self.id
    }

    fn document_id(&self) -> String {
        self.id.to_full_string()
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.currency)
    }
}

/// Validation errors for accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyName,
    NameTooLong(usize),
    InvalidCurrency(String),
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Account name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Account name too long ({} chars, max 100)", len)
            }
            Self::InvalidCurrency(code) => {
                write!(f, "Currency must be a three-letter code, got '{}'", code)
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}
