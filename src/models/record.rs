//! Record model
//!
//! A record is one line of the ledger: an expense, an income, or one leg of
//! a transfer. Records entered together share a `record_num` and are shown
//! as a single stack. The two legs of a transfer share a `record_num` and
//! each leg's note holds the other leg's account id.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::date::DateStamp;
use super::ids::{AccountId, CategoryId, RecordId};
use super::money::Money;
use super::table::{Entity, TableName};

/// Direction of a record, serialized as a single character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RecordType {
    #[serde(rename = "-")]
    #[default]
    Expense,
    #[serde(rename = "+")]
    Income,
    #[serde(rename = ">")]
    OutTransfer,
    #[serde(rename = "<")]
    InTransfer,
}

impl RecordType {
    pub fn as_char(&self) -> char {
        match self {
            Self::Expense => '-',
            Self::Income => '+',
            Self::OutTransfer => '>',
            Self::InTransfer => '<',
        }
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::OutTransfer | Self::InTransfer)
    }

    /// Money leaves the account
    pub fn is_outflow(&self) -> bool {
        matches!(self, Self::Expense | Self::OutTransfer)
    }

    /// The transfer type moving money in the same direction
    pub fn as_transfer(&self) -> Self {
        match self {
            Self::Expense | Self::OutTransfer => Self::OutTransfer,
            Self::Income | Self::InTransfer => Self::InTransfer,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "-" | "expense" => Some(Self::Expense),
            "+" | "income" => Some(Self::Income),
            ">" | "out" => Some(Self::OutTransfer),
            "<" | "in" => Some(Self::InTransfer),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense => write!(f, "Expense"),
            Self::Income => write!(f, "Income"),
            Self::OutTransfer => write!(f, "Transfer out"),
            Self::InTransfer => write!(f, "Transfer in"),
        }
    }
}

/// A ledger record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier
    pub id: RecordId,

    /// Stack number shared by records entered together
    pub record_num: i64,

    pub date: DateStamp,

    #[serde(rename = "type")]
    pub record_type: RecordType,

    pub account_id: AccountId,

    /// Total amount, always positive; the type carries the direction
    pub amount: Money,

    /// Number of units bought, when the amount is a unit price times quantity
    #[serde(default)]
    pub quantity: Option<u32>,

    #[serde(default)]
    pub category_id: Option<CategoryId>,

    #[serde(default)]
    pub subcategory_id: Option<CategoryId>,

    /// Free text; the counterpart account id on transfer legs
    #[serde(default)]
    pub note: Option<String>,
}

impl Record {
    /// Create a record with no category, quantity, or note
    pub fn new(
        record_num: i64,
        date: DateStamp,
        record_type: RecordType,
        account_id: AccountId,
        amount: Money,
    ) -> Self {
        Self {
            id: RecordId::new(),
            record_num,
            date,
            record_type,
            account_id,
            amount,
            quantity: None,
            category_id: None,
            subcategory_id: None,
            note: None,
        }
    }

    /// Effect of this record on its account balance
    pub fn signed_amount(&self) -> Money {
        if self.record_type.is_outflow() {
            -self.amount
        } else {
            self.amount
        }
    }

    pub fn is_transfer(&self) -> bool {
        self.record_type.is_transfer()
    }

    /// Account on the other side of a transfer leg
    pub fn counterpart_account_id(&self) -> Option<AccountId> {
        if !self.is_transfer() {
            return None;
        }
        self.note.as_deref().and_then(|note| note.parse().ok())
    }

    /// True when the note references `account_id` in full form
    pub fn references_account(&self, account_id: AccountId) -> bool {
        self.note.as_deref() == Some(account_id.to_full_string().as_str())
    }

    /// Turn the record into a transfer leg with no counterpart.
    ///
    /// Direction and amount are kept, so the account balance is unaffected.
    pub fn into_unpaired_transfer(mut self) -> Self {
        self.record_type = self.record_type.as_transfer();
        self.note = None;
        self.category_id = None;
        self.subcategory_id = None;
        self
    }

    /// Most specific category on the record
    pub fn subcategory_or_category(&self) -> Option<CategoryId> {
        self.subcategory_id.or(self.category_id)
    }

    /// True when `category_id` is the record's category or subcategory
    pub fn has_category(&self, category_id: CategoryId) -> bool {
        self.category_id == Some(category_id) || self.subcategory_id == Some(category_id)
    }

    /// Validate the record
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if !self.amount.is_positive() {
            return Err(RecordValidationError::NonPositiveAmount);
        }

        if self.quantity == Some(0) {
            return Err(RecordValidationError::ZeroQuantity);
        }

        if self.date.to_datetime().is_none() {
            return Err(RecordValidationError::InvalidDate(self.date.value()));
        }

        if self.subcategory_id.is_some() && self.category_id.is_none() {
            return Err(RecordValidationError::SubcategoryWithoutCategory);
        }

        if self.is_transfer() && (self.category_id.is_some() || self.subcategory_id.is_some()) {
            return Err(RecordValidationError::CategorizedTransfer);
        }

        Ok(())
    }
}

impl Entity for Record {
    type Key = RecordId;

    const TABLE: TableName = TableName::Record;

    fn key(&self) -> RecordId {
        self.id
    }

    fn document_id(&self) -> String {
        self.id.to_full_string()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {} {}",
            self.record_num,
            self.date,
            self.record_type.as_char(),
            self.amount
        )
    }
}

/// Check that two records form a consistent transfer pair
pub fn validate_transfer_pair(out: &Record, into: &Record) -> Result<(), RecordValidationError> {
    if out.record_type != RecordType::OutTransfer || into.record_type != RecordType::InTransfer {
        return Err(RecordValidationError::TransferDirection);
    }

    if out.record_num != into.record_num {
        return Err(RecordValidationError::TransferStackMismatch {
            out: out.record_num,
            into: into.record_num,
        });
    }

    if out.account_id == into.account_id {
        return Err(RecordValidationError::TransferToSameAccount);
    }

    if out.counterpart_account_id() != Some(into.account_id)
        || into.counterpart_account_id() != Some(out.account_id)
    {
        return Err(RecordValidationError::TransferNotesMismatch);
    }

    Ok(())
}

/// Validation errors for records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    NonPositiveAmount,
    ZeroQuantity,
    InvalidDate(i64),
    SubcategoryWithoutCategory,
    CategorizedTransfer,
    TransferDirection,
    TransferStackMismatch { out: i64, into: i64 },
    TransferToSameAccount,
    TransferNotesMismatch,
}

impl fmt::Display for RecordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount => write!(f, "Amount must be greater than zero"),
            Self::ZeroQuantity => write!(f, "Quantity must be at least 1"),
            Self::InvalidDate(value) => write!(f, "Invalid record date: {}", value),
            Self::SubcategoryWithoutCategory => {
                write!(f, "A subcategory requires its parent category")
            }
            Self::CategorizedTransfer => write!(f, "Transfers cannot have a category"),
            Self::TransferDirection => {
                write!(f, "A transfer needs one outgoing and one incoming leg")
            }
            Self::TransferStackMismatch { out, into } => write!(
                f,
                "Transfer legs must share a record number ({} vs {})",
                out, into
            ),
            Self::TransferToSameAccount => {
                write!(f, "Cannot transfer between an account and itself")
            }
            Self::TransferNotesMismatch => {
                write!(f, "Transfer legs must reference each other's accounts")
            }
        }
    }
}

impl std::error::Error for RecordValidationError {}
