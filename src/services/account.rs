//! Account service
//!
//! Provides business logic for account management: creation, lookup, and
//! saving an edited account list. Deleting an account removes its records and
//! turns transfers that point at it into one-sided transfers.

use std::collections::HashSet;

use tracing::info;

use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{Account, AccountId, Budget, BudgetOnWidget, Money, Record};
use crate::sync::{EntitiesToSync, Repositories};

/// Service for account management
pub struct AccountService<'a> {
    repos: &'a Repositories,
}

/// What saving an account list did to the records table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountDeletion {
    /// Records that belonged to deleted accounts
    pub removed_records: Vec<Record>,
    /// Transfer legs whose counterpart account was deleted
    pub converted_records: Vec<Record>,
    /// Budgets left without any linked account
    pub removed_budgets: Vec<Budget>,
}

impl<'a> AccountService<'a> {
    /// Create a new account service
    pub fn new(repos: &'a Repositories) -> Self {
        Self { repos }
    }

    /// Create a new account
    pub fn create(&self, name: &str, currency: &str, balance: Money) -> PocketbookResult<Account> {
        let name = name.trim();
        let accounts = self.repos.accounts.get_all()?;

        if accounts
            .iter()
            .any(|account| account.name.eq_ignore_ascii_case(name))
        {
            return Err(PocketbookError::Duplicate {
                entity_type: "Account",
                identifier: name.to_string(),
            });
        }

        let mut account = Account::with_balance(name, currency.trim().to_uppercase(), balance);
        account.order_num = accounts
            .iter()
            .map(|account| account.order_num)
            .max()
            .unwrap_or(0)
            + 1;

        account
            .validate()
            .map_err(|e| PocketbookError::Validation(e.to_string()))?;

        self.repos.accounts.upsert(std::slice::from_ref(&account))?;
        Ok(account)
    }

    /// Get an account by ID
    pub fn get(&self, id: AccountId) -> PocketbookResult<Option<Account>> {
        self.repos.accounts.get(&id)
    }

    /// Find an account by name (case-insensitive) or ID string
    pub fn find(&self, identifier: &str) -> PocketbookResult<Option<Account>> {
        let accounts = self.repos.accounts.get_all()?;
        if let Some(account) = accounts
            .iter()
            .find(|account| account.name.eq_ignore_ascii_case(identifier))
        {
            return Ok(Some(account.clone()));
        }

        Ok(accounts.iter().find(|account| account.id.matches(identifier)).cloned())
    }

    /// Accounts in display order
    pub fn list(&self, include_hidden: bool) -> PocketbookResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .repos
            .accounts
            .get_all()?
            .into_iter()
            .filter(|account| include_hidden || !account.hide)
            .collect();
        accounts.sort_by(|a, b| a.order_num.cmp(&b.order_num).then(a.name.cmp(&b.name)));
        Ok(accounts)
    }

    /// Replace the stored account list with `accounts`
    ///
    /// Accounts missing from `accounts` are deleted together with their
    /// records. Records elsewhere whose note names a deleted account become
    /// transfers without a counterpart, keeping their amount and direction.
    /// Budgets lose their links to deleted accounts; a budget left with no
    /// linked account is deleted and unpinned.
    pub fn save_accounts(&self, accounts: Vec<Account>) -> PocketbookResult<AccountDeletion> {
        for account in &accounts {
            account
                .validate()
                .map_err(|e| PocketbookError::Validation(e.to_string()))?;
        }

        let current = self.repos.accounts.get_all()?;
        let change = EntitiesToSync::between(&current, &accounts);

        if change.to_delete.is_empty() {
            self.repos.accounts.upsert(&change.to_upsert)?;
            return Ok(AccountDeletion::default());
        }

        let deleted: HashSet<AccountId> = change.to_delete.iter().map(|a| a.id).collect();
        let (removed_records, remaining): (Vec<Record>, Vec<Record>) = self
            .repos
            .records
            .get_all()?
            .into_iter()
            .partition(|record| deleted.contains(&record.account_id));

        let converted_records: Vec<Record> = remaining
            .into_iter()
            .filter(|record| deleted.iter().any(|id| record.references_account(*id)))
            .map(Record::into_unpaired_transfer)
            .collect();

        let record_change = EntitiesToSync {
            to_delete: removed_records.clone(),
            to_upsert: converted_records.clone(),
        };
        if !record_change.is_empty() {
            self.repos.records.delete_and_upsert(&record_change)?;
        }

        let removed_budgets = self.unlink_budgets(&deleted)?;

        info!(
            deleted_accounts = deleted.len(),
            removed = removed_records.len(),
            converted = converted_records.len(),
            removed_budgets = removed_budgets.len(),
            "deleted accounts"
        );

        self.repos.accounts.delete_and_upsert(&change)?;

        Ok(AccountDeletion {
            removed_records,
            converted_records,
            removed_budgets,
        })
    }

    /// Drop `deleted` from every budget's links, returning the budgets removed
    fn unlink_budgets(&self, deleted: &HashSet<AccountId>) -> PocketbookResult<Vec<Budget>> {
        let mut budget_change: EntitiesToSync<Budget> = EntitiesToSync::default();
        for mut budget in self.repos.budgets.get_all()? {
            if !budget.linked_account_ids.iter().any(|id| deleted.contains(id)) {
                continue;
            }
            let original = budget.clone();
            budget.linked_account_ids.retain(|id| !deleted.contains(id));
            if budget.linked_account_ids.is_empty() {
                budget_change.to_delete.push(original);
            } else {
                budget_change.to_upsert.push(budget);
            }
        }
        if budget_change.is_empty() {
            return Ok(Vec::new());
        }

        let unpinned: Vec<BudgetOnWidget> = self
            .repos
            .budgets_on_widgets
            .get_all()?
            .into_iter()
            .filter(|pin| budget_change.to_delete.iter().any(|b| b.id == pin.budget_id))
            .collect();
        if !unpinned.is_empty() {
            self.repos
                .budgets_on_widgets
                .delete_and_upsert(&EntitiesToSync::delete_only(unpinned))?;
        }

        self.repos.budgets.delete_and_upsert(&budget_change)?;
        Ok(budget_change.to_delete)
    }

    /// Delete a single account
    pub fn delete(&self, id: AccountId) -> PocketbookResult<AccountDeletion> {
        let accounts = self.repos.accounts.get_all()?;
        if !accounts.iter().any(|account| account.id == id) {
            return Err(PocketbookError::account_not_found(id.to_string()));
        }

        self.save_accounts(
            accounts
                .into_iter()
                .filter(|account| account.id != id)
                .collect(),
        )
    }
}
