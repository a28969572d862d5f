//! Derived finance state
//!
//! Holds the account list and the budgets with their used amounts for one
//! reference instant. Record mutations go through here so that the budget
//! figures follow each change incrementally: the records a mutation removed
//! are subtracted, the ones it added are added. A full `recompute` gives the
//! same figures.

use chrono::NaiveDateTime;

use crate::error::PocketbookResult;
use crate::models::{Account, BudgetsByPeriod, DateStamp};
use crate::services::{
    AccountService, BudgetService, RecordChange, RecordDraft, RecordService, TransferDraft,
};
use crate::sync::Repositories;

pub struct FinanceState<'a> {
    repos: &'a Repositories,
    pub reference: NaiveDateTime,
    pub accounts: Vec<Account>,
    pub budgets: BudgetsByPeriod,
}

impl<'a> FinanceState<'a> {
    pub fn load(repos: &'a Repositories, reference: NaiveDateTime) -> PocketbookResult<Self> {
        Ok(Self {
            repos,
            reference,
            accounts: AccountService::new(repos).list(true)?,
            budgets: BudgetService::new(repos).budgets_by_period(reference)?,
        })
    }

    pub fn save_records(&mut self, draft: &RecordDraft) -> PocketbookResult<RecordChange> {
        let change = RecordService::new(self.repos).save_records(draft)?;
        self.apply(&change)?;
        Ok(change)
    }

    pub fn save_transfer(&mut self, draft: &TransferDraft) -> PocketbookResult<RecordChange> {
        let change = RecordService::new(self.repos).save_transfer(draft)?;
        self.apply(&change)?;
        Ok(change)
    }

    pub fn repeat(&mut self, record_num: i64, date: DateStamp) -> PocketbookResult<RecordChange> {
        let change = RecordService::new(self.repos).repeat(record_num, date)?;
        self.apply(&change)?;
        Ok(change)
    }

    pub fn replace_stack(
        &mut self,
        record_num: i64,
        draft: &RecordDraft,
    ) -> PocketbookResult<RecordChange> {
        let change = RecordService::new(self.repos).replace_stack(record_num, draft)?;
        self.apply(&change)?;
        Ok(change)
    }

    pub fn delete_stack(&mut self, record_num: i64) -> PocketbookResult<RecordChange> {
        let change = RecordService::new(self.repos).delete_stack(record_num)?;
        self.apply(&change)?;
        Ok(change)
    }

    /// Rebuild every derived figure from the stored data
    pub fn recompute(&mut self) -> PocketbookResult<()> {
        self.accounts = AccountService::new(self.repos).list(true)?;
        self.budgets = BudgetService::new(self.repos).budgets_by_period(self.reference)?;
        Ok(())
    }

    fn apply(&mut self, change: &RecordChange) -> PocketbookResult<()> {
        self.budgets = self
            .budgets
            .subtract_used_amounts_by_records(&change.removed)
            .add_used_amounts_by_records(&change.added);
        self.accounts = AccountService::new(self.repos).list(true)?;
        Ok(())
    }
}
