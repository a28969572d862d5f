//! Record service
//!
//! Records are saved in stacks: every record created by one save shares a
//! record number. A transfer is a stack of two legs whose notes name each
//! other's account. Every mutation adjusts the balances of the accounts it
//! touches and reports what it removed and added, so callers can update
//! derived budget figures incrementally.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{
    validate_transfer_pair, Account, AccountId, CategoryId, DateStamp, Money, Record, RecordId,
    RecordType,
};
use crate::sync::{EntitiesToSync, Repositories};

/// One line of a record stack
#[derive(Debug, Clone, PartialEq)]
pub struct RecordItem {
    /// Price of one unit
    pub amount: Money,
    pub quantity: Option<u32>,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<CategoryId>,
    pub note: Option<String>,
}

impl RecordItem {
    pub fn new(amount: Money) -> Self {
        Self {
            amount,
            quantity: None,
            category_id: None,
            subcategory_id: None,
            note: None,
        }
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_subcategory(mut self, category_id: CategoryId, subcategory_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self.subcategory_id = Some(subcategory_id);
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

/// An expense or income stack to be saved
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub date: DateStamp,
    pub record_type: RecordType,
    pub account_id: AccountId,
    pub items: Vec<RecordItem>,
}

/// A transfer between two accounts
#[derive(Debug, Clone, PartialEq)]
pub struct TransferDraft {
    pub date: DateStamp,
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Money,
    /// Amount credited to the destination when it differs (currency exchange)
    pub received_amount: Option<Money>,
}

/// Records removed and added by one mutation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordChange {
    pub removed: Vec<Record>,
    pub added: Vec<Record>,
}

impl RecordChange {
    /// Net balance change per account
    pub fn balance_deltas(&self) -> BTreeMap<AccountId, Money> {
        let mut deltas: BTreeMap<AccountId, Money> = BTreeMap::new();
        for record in &self.removed {
            *deltas.entry(record.account_id).or_default() -= record.signed_amount();
        }
        for record in &self.added {
            *deltas.entry(record.account_id).or_default() += record.signed_amount();
        }
        deltas
    }
}

/// Service for record management
pub struct RecordService<'a> {
    repos: &'a Repositories,
}

impl<'a> RecordService<'a> {
    /// Create a new record service
    pub fn new(repos: &'a Repositories) -> Self {
        Self { repos }
    }

    /// Save an expense or income stack under a fresh record number
    pub fn save_records(&self, draft: &RecordDraft) -> PocketbookResult<RecordChange> {
        let record_num = self.next_record_num()?;
        let records = self.build_stack(record_num, draft)?;

        self.repos.records.upsert(&records)?;
        self.finish(RecordChange {
            removed: Vec::new(),
            added: records,
        })
    }

    /// Save both legs of a transfer
    pub fn save_transfer(&self, draft: &TransferDraft) -> PocketbookResult<RecordChange> {
        self.require_account(draft.from_account_id)?;
        self.require_account(draft.to_account_id)?;

        let record_num = self.next_record_num()?;
        let mut out = Record::new(
            record_num,
            draft.date,
            RecordType::OutTransfer,
            draft.from_account_id,
            draft.amount,
        );
        out.note = Some(draft.to_account_id.to_full_string());

        let mut into = Record::new(
            record_num,
            draft.date,
            RecordType::InTransfer,
            draft.to_account_id,
            draft.received_amount.unwrap_or(draft.amount),
        );
        into.note = Some(draft.from_account_id.to_full_string());

        for record in [&out, &into] {
            record
                .validate()
                .map_err(|e| PocketbookError::Validation(e.to_string()))?;
        }
        validate_transfer_pair(&out, &into)
            .map_err(|e| PocketbookError::Validation(e.to_string()))?;

        let records = vec![out, into];
        self.repos.records.upsert(&records)?;
        self.finish(RecordChange {
            removed: Vec::new(),
            added: records,
        })
    }

    /// Copy an existing stack to `date` under a fresh record number
    pub fn repeat(&self, record_num: i64, date: DateStamp) -> PocketbookResult<RecordChange> {
        let stack = self.require_stack(record_num)?;
        let new_num = self.next_record_num()?;

        let records: Vec<Record> = stack
            .into_iter()
            .map(|record| Record {
                id: RecordId::new(),
                record_num: new_num,
                date,
                ..record
            })
            .collect();

        self.repos.records.upsert(&records)?;
        self.finish(RecordChange {
            removed: Vec::new(),
            added: records,
        })
    }

    /// Delete every record of a stack
    pub fn delete_stack(&self, record_num: i64) -> PocketbookResult<RecordChange> {
        let stack = self.require_stack(record_num)?;

        self.repos.records.delete_and_upsert(&EntitiesToSync::delete_only(stack.clone()))?;
        self.finish(RecordChange {
            removed: stack,
            added: Vec::new(),
        })
    }

    /// Replace a stack with `draft`, keeping its record number
    pub fn replace_stack(
        &self,
        record_num: i64,
        draft: &RecordDraft,
    ) -> PocketbookResult<RecordChange> {
        let stack = self.require_stack(record_num)?;
        let records = self.build_stack(record_num, draft)?;

        self.repos.records.delete_and_upsert(&EntitiesToSync {
            to_delete: stack.clone(),
            to_upsert: records.clone(),
        })?;
        self.finish(RecordChange {
            removed: stack,
            added: records,
        })
    }

    /// Records newest first, optionally for one account
    pub fn list(
        &self,
        account_id: Option<AccountId>,
        limit: Option<usize>,
    ) -> PocketbookResult<Vec<Record>> {
        let mut records: Vec<Record> = self
            .repos
            .records
            .get_all()?
            .into_iter()
            .filter(|record| account_id.map_or(true, |id| record.account_id == id))
            .collect();
        records.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(b.record_num.cmp(&a.record_num))
                .then(a.record_type.as_char().cmp(&b.record_type.as_char()))
        });
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    /// Every record sharing `record_num`
    pub fn stack(&self, record_num: i64) -> PocketbookResult<Vec<Record>> {
        Ok(self
            .repos
            .records
            .get_all()?
            .into_iter()
            .filter(|record| record.record_num == record_num)
            .collect())
    }

    fn require_stack(&self, record_num: i64) -> PocketbookResult<Vec<Record>> {
        let stack = self.stack(record_num)?;
        if stack.is_empty() {
            return Err(PocketbookError::record_not_found(format!("#{}", record_num)));
        }
        Ok(stack)
    }

    fn require_account(&self, id: AccountId) -> PocketbookResult<Account> {
        self.repos
            .accounts
            .get(&id)?
            .ok_or_else(|| PocketbookError::account_not_found(id.to_string()))
    }

    fn next_record_num(&self) -> PocketbookResult<i64> {
        Ok(self
            .repos
            .records
            .get_all()?
            .iter()
            .map(|record| record.record_num)
            .max()
            .unwrap_or(0)
            + 1)
    }

    fn build_stack(&self, record_num: i64, draft: &RecordDraft) -> PocketbookResult<Vec<Record>> {
        if draft.record_type.is_transfer() {
            return Err(PocketbookError::Validation(
                "Transfers are saved as a pair, not as a record stack".into(),
            ));
        }
        if draft.items.is_empty() {
            return Err(PocketbookError::Validation(
                "A record stack needs at least one item".into(),
            ));
        }
        self.require_account(draft.account_id)?;

        let mut records = Vec::with_capacity(draft.items.len());
        for item in &draft.items {
            self.check_categories(item)?;

            let quantity = item.quantity.unwrap_or(1);
            let amount = item.amount.checked_mul(quantity).ok_or_else(|| {
                PocketbookError::Validation(format!(
                    "Amount {} times quantity {} is too large",
                    item.amount, quantity
                ))
            })?;
            let mut record = Record::new(
                record_num,
                draft.date,
                draft.record_type,
                draft.account_id,
                amount,
            );
            record.quantity = item.quantity;
            record.category_id = item.category_id;
            record.subcategory_id = item.subcategory_id;
            record.note = item.note.clone().filter(|note| !note.trim().is_empty());
            record
                .validate()
                .map_err(|e| PocketbookError::Validation(e.to_string()))?;
            records.push(record);
        }
        Ok(records)
    }

    fn check_categories(&self, item: &RecordItem) -> PocketbookResult<()> {
        if let Some(category_id) = item.category_id {
            self.repos
                .categories
                .get(&category_id)?
                .ok_or_else(|| PocketbookError::category_not_found(category_id.to_string()))?;
        }
        if let Some(subcategory_id) = item.subcategory_id {
            let subcategory = self
                .repos
                .categories
                .get(&subcategory_id)?
                .ok_or_else(|| PocketbookError::category_not_found(subcategory_id.to_string()))?;
            if subcategory.parent_category_id != item.category_id {
                return Err(PocketbookError::Validation(format!(
                    "'{}' is not a subcategory of the chosen category",
                    subcategory.name
                )));
            }
        }
        Ok(())
    }

    /// Apply the change to account balances
    fn finish(&self, change: RecordChange) -> PocketbookResult<RecordChange> {
        let mut updated = Vec::new();
        for (account_id, delta) in change.balance_deltas() {
            if delta.is_zero() {
                continue;
            }
            // The account may be gone when a converted transfer leg is edited.
            if let Some(mut account) = self.repos.accounts.get(&account_id)? {
                account.balance += delta;
                updated.push(account);
            }
        }

        if !updated.is_empty() {
            self.repos.accounts.upsert(&updated)?;
        }

        debug!(
            removed = change.removed.len(),
            added = change.added.len(),
            accounts = updated.len(),
            "records changed"
        );
        Ok(change)
    }
}
