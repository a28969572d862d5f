//! Budget service
//!
//! Stores budget definitions and produces the derived view: budgets grouped
//! by period with their current ranges and used amounts filled from the
//! stored records.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{
    AccountId, Budget, BudgetId, BudgetOnWidget, BudgetsByPeriod, CategoryId, Money,
    RepeatingPeriod, TotalAmountByRange,
};
use crate::sync::{EntitiesToSync, Repositories};

/// Fields of a budget to be created
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetDraft {
    pub name: String,
    pub amount_limit: Money,
    pub repeating_period: RepeatingPeriod,
    pub category_id: Option<CategoryId>,
    pub linked_account_ids: Vec<AccountId>,
}

/// Service for budget management
pub struct BudgetService<'a> {
    repos: &'a Repositories,
}

impl<'a> BudgetService<'a> {
    /// Create a new budget service
    pub fn new(repos: &'a Repositories) -> Self {
        Self { repos }
    }

    /// Create a budget at the lowest priority of its period
    pub fn create(&self, draft: BudgetDraft) -> PocketbookResult<Budget> {
        for id in &draft.linked_account_ids {
            if self.repos.accounts.get(id)?.is_none() {
                return Err(PocketbookError::account_not_found(id.to_string()));
            }
        }
        if let Some(category_id) = draft.category_id {
            if self.repos.categories.get(&category_id)?.is_none() {
                return Err(PocketbookError::category_not_found(category_id.to_string()));
            }
        }

        let budgets = self.repos.budgets.get_all()?;
        let mut budget = Budget::new(draft.name.trim(), draft.amount_limit, draft.repeating_period);
        budget.category_id = draft.category_id;
        budget.linked_account_ids = draft.linked_account_ids;
        budget.priority_num = budgets
            .iter()
            .filter(|b| b.repeating_period == budget.repeating_period)
            .map(|b| b.priority_num)
            .max()
            .unwrap_or(0)
            + 1;

        budget
            .validate()
            .map_err(|e| PocketbookError::Validation(e.to_string()))?;

        self.repos.budgets.upsert(std::slice::from_ref(&budget))?;
        Ok(budget)
    }

    pub fn get(&self, id: BudgetId) -> PocketbookResult<Option<Budget>> {
        self.repos.budgets.get(&id)
    }

    /// Find a budget by name (case-insensitive) or ID string
    pub fn find(&self, identifier: &str) -> PocketbookResult<Option<Budget>> {
        let budgets = self.repos.budgets.get_all()?;
        if let Some(budget) = budgets
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(identifier))
        {
            return Ok(Some(budget.clone()));
        }

        Ok(budgets.iter().find(|b| b.id.matches(identifier)).cloned())
    }

    /// Stored budgets, daily first, each period by priority
    pub fn list(&self) -> PocketbookResult<Vec<Budget>> {
        Ok(BudgetsByPeriod::from_budgets(self.repos.budgets.get_all()?).concatenate())
    }

    /// Budgets with their ranges around `reference` and used amounts filled
    pub fn budgets_by_period(&self, reference: NaiveDateTime) -> PocketbookResult<BudgetsByPeriod> {
        let records = self.repos.records.get_all()?;
        let budgets = BudgetsByPeriod::from_budgets(self.repos.budgets.get_all()?)
            .with_date_ranges(reference)
            .fill_used_amounts_by_records(&records);
        debug!(records = records.len(), "filled budget used amounts");
        Ok(budgets)
    }

    /// Delete a budget and unpin it from the home-screen widget
    pub fn delete(&self, id: BudgetId) -> PocketbookResult<Budget> {
        let budget = self
            .get(id)?
            .ok_or_else(|| PocketbookError::budget_not_found(id.to_string()))?;

        let pinned: Vec<BudgetOnWidget> = self
            .repos
            .budgets_on_widgets
            .get_all()?
            .into_iter()
            .filter(|pin| pin.budget_id == id)
            .collect();
        if !pinned.is_empty() {
            self.repos.budgets_on_widgets.delete_and_upsert(&EntitiesToSync::delete_only(pinned))?;
        }

        self.repos.budgets.delete_and_upsert(&EntitiesToSync::delete_only(vec![budget.clone()]))?;
        Ok(budget)
    }

    /// Used amount of one budget over its last `count` ranges, oldest first
    pub fn statistics(
        &self,
        id: BudgetId,
        reference: NaiveDateTime,
        count: usize,
    ) -> PocketbookResult<Vec<TotalAmountByRange>> {
        if count == 0 {
            return Err(PocketbookError::Budget(
                "Statistics need at least one period".into(),
            ));
        }
        let budget = self
            .get(id)?
            .ok_or_else(|| PocketbookError::budget_not_found(id.to_string()))?;
        let records = self.repos.records.get_all()?;
        Ok(budget.used_amounts_by_ranges(&records, reference, count))
    }
}
