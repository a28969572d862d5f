//! Budget model and used-amount aggregation
//!
//! A budget limits spending for an optional category across a set of linked
//! accounts over a repeating period. The active date range, the used amount,
//! and the used percentage are derived from the stored records and are never
//! persisted.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::date::DateRange;
use super::ids::{AccountId, BudgetId, CategoryId};
use super::money::Money;
use super::period::RepeatingPeriod;
use super::record::{Record, RecordType};
use super::table::{Entity, TableName};

/// A spending limit over a repeating period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,

    /// Display order inside the period bucket
    #[serde(default)]
    pub priority_num: i32,

    pub amount_limit: Money,

    /// Restricts the budget to one category; `None` counts every category
    #[serde(default)]
    pub category_id: Option<CategoryId>,

    pub name: String,

    pub repeating_period: RepeatingPeriod,

    #[serde(default)]
    pub linked_account_ids: Vec<AccountId>,

    #[serde(skip)]
    pub date_range: Option<DateRange>,

    #[serde(skip)]
    pub used_amount: Money,

    #[serde(skip)]
    pub used_percentage: f64,
}

impl Budget {
    pub fn new(
        name: impl Into<String>,
        amount_limit: Money,
        repeating_period: RepeatingPeriod,
    ) -> Self {
        Self {
            id: BudgetId::new(),
            priority_num: 0,
            amount_limit,
            category_id: None,
            name: name.into(),
            repeating_period,
            linked_account_ids: Vec::new(),
            date_range: None,
            used_amount: Money::zero(),
            used_percentage: 0.0,
        }
    }

    /// Set the active range to the period containing `reference`
    pub fn with_date_range(mut self, reference: NaiveDateTime) -> Self {
        self.date_range = Some(self.repeating_period.range_containing(reference));
        self
    }

    /// Replace the used amount and recompute the percentage
    pub fn set_used_amount(&mut self, used_amount: Money) {
        self.used_amount = used_amount;
        self.used_percentage = used_amount.percent_of(self.amount_limit);
    }

    pub fn remaining(&self) -> Money {
        self.amount_limit - self.used_amount
    }

    /// How much `record` moves this budget's used amount, ignoring dates
    pub fn contribution(&self, record: &Record) -> Money {
        if record.is_transfer() || !self.linked_account_ids.contains(&record.account_id) {
            return Money::zero();
        }
        if let Some(category_id) = self.category_id {
            if !record.has_category(category_id) {
                return Money::zero();
            }
        }
        match record.record_type {
            RecordType::Expense => record.amount,
            RecordType::Income => -record.amount,
            RecordType::OutTransfer | RecordType::InTransfer => Money::zero(),
        }
    }

    /// Total contribution of `records` to this budget, ignoring dates
    pub fn total_of(&self, records: &[Record]) -> Money {
        records.iter().map(|record| self.contribution(record)).sum()
    }

    /// Used amount for the current range and the `count - 1` ranges before it, oldest first
    pub fn used_amounts_by_ranges(
        &self,
        records: &[Record],
        reference: NaiveDateTime,
        count: usize,
    ) -> Vec<TotalAmountByRange> {
        self.repeating_period
            .ranges_ending_at(reference, count)
            .into_iter()
            .map(|date_range| {
                let total_amount = records
                    .iter()
                    .filter(|record| date_range.contains(record.date))
                    .map(|record| self.contribution(record))
                    .sum();
                TotalAmountByRange {
                    date_range,
                    total_amount,
                }
            })
            .collect()
    }

    /// Validate the budget
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.name.trim().is_empty() {
            return Err(BudgetValidationError::EmptyName);
        }
        if self.amount_limit.is_negative() {
            return Err(BudgetValidationError::NegativeLimit);
        }
        if self.linked_account_ids.is_empty() {
            return Err(BudgetValidationError::NoLinkedAccounts);
        }
        Ok(())
    }
}

impl Entity for Budget {
    type Key = BudgetId;

    const TABLE: TableName = TableName::Budget;

    fn key(&self) -> BudgetId {
        self.id
    }

    fn document_id(&self) -> String {
        self.id.to_full_string()
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.repeating_period)
    }
}

/// Amount used in one past or current range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalAmountByRange {
    pub date_range: DateRange,
    pub total_amount: Money,
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    EmptyName,
    NegativeLimit,
    NoLinkedAccounts,
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Budget name cannot be empty"),
            Self::NegativeLimit => write!(f, "Budget limit cannot be negative"),
            Self::NoLinkedAccounts => write!(f, "Budget must be linked to at least one account"),
        }
    }
}

impl std::error::Error for BudgetValidationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UsedAmountUpdate {
    Fill,
    Add,
    Subtract,
}

/// Budgets partitioned by repeating period, each bucket sorted by priority
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BudgetsByPeriod {
    pub daily: Vec<Budget>,
    pub weekly: Vec<Budget>,
    pub monthly: Vec<Budget>,
    pub yearly: Vec<Budget>,
}

impl BudgetsByPeriod {
    pub fn from_budgets(budgets: impl IntoIterator<Item = Budget>) -> Self {
        let mut grouped = Self::default();
        for budget in budgets {
            grouped.bucket_mut(budget.repeating_period).push(budget);
        }
        for period in RepeatingPeriod::COARSE_TO_FINE {
            grouped
                .bucket_mut(period)
                .sort_by_key(|budget| budget.priority_num);
        }
        grouped
    }

    pub fn are_empty(&self) -> bool {
        RepeatingPeriod::COARSE_TO_FINE
            .iter()
            .all(|period| self.get(*period).is_empty())
    }

    pub fn find_by_id(&self, id: BudgetId) -> Option<&Budget> {
        RepeatingPeriod::COARSE_TO_FINE
            .iter()
            .find_map(|period| self.get(*period).iter().find(|budget| budget.id == id))
    }

    /// Every budget, daily bucket first
    pub fn concatenate(&self) -> Vec<Budget> {
        self.daily
            .iter()
            .chain(&self.weekly)
            .chain(&self.monthly)
            .chain(&self.yearly)
            .cloned()
            .collect()
    }

    pub fn get(&self, period: RepeatingPeriod) -> &[Budget] {
        match period {
            RepeatingPeriod::Daily => &self.daily,
            RepeatingPeriod::Weekly => &self.weekly,
            RepeatingPeriod::Monthly => &self.monthly,
            RepeatingPeriod::Yearly => &self.yearly,
        }
    }

    fn bucket_mut(&mut self, period: RepeatingPeriod) -> &mut Vec<Budget> {
        match period {
            RepeatingPeriod::Daily => &mut self.daily,
            RepeatingPeriod::Weekly => &mut self.weekly,
            RepeatingPeriod::Monthly => &mut self.monthly,
            RepeatingPeriod::Yearly => &mut self.yearly,
        }
    }

    /// Insert into the bucket of the budget's own period, keeping priority order
    pub fn add_budget(&mut self, budget: Budget) {
        let bucket = self.bucket_mut(budget.repeating_period);
        bucket.push(budget);
        bucket.sort_by_key(|budget| budget.priority_num);
    }

    /// Remove a budget from the bucket of `period`; true when something was removed
    pub fn delete_budget(&mut self, id: BudgetId, period: RepeatingPeriod) -> bool {
        let bucket = self.bucket_mut(period);
        let before = bucket.len();
        bucket.retain(|budget| budget.id != id);
        bucket.len() != before
    }

    /// Range of the first budget in the coarsest non-empty bucket
    pub fn max_date_range(&self) -> Option<DateRange> {
        RepeatingPeriod::COARSE_TO_FINE
            .iter()
            .map(|period| self.get(*period))
            .find(|bucket| !bucket.is_empty())
            .and_then(|bucket| bucket.first())
            .and_then(|budget| budget.date_range)
    }

    /// Assign every budget the range of its period that contains `reference`
    pub fn with_date_ranges(&self, reference: NaiveDateTime) -> Self {
        let mut updated = self.clone();
        for period in RepeatingPeriod::COARSE_TO_FINE {
            for budget in updated.bucket_mut(period).iter_mut() {
                budget.date_range = Some(period.range_containing(reference));
            }
        }
        updated
    }

    /// Recompute every used amount from scratch
    pub fn fill_used_amounts_by_records(&self, records: &[Record]) -> Self {
        self.apply_records(records, UsedAmountUpdate::Fill)
    }

    /// Add the contributions of newly created records
    pub fn add_used_amounts_by_records(&self, records: &[Record]) -> Self {
        if records.is_empty() {
            return self.clone();
        }
        self.apply_records(records, UsedAmountUpdate::Add)
    }

    /// Remove the contributions of deleted records
    pub fn subtract_used_amounts_by_records(&self, records: &[Record]) -> Self {
        if records.is_empty() {
            return self.clone();
        }
        self.apply_records(records, UsedAmountUpdate::Subtract)
    }

    // Each bucket filters the full record list by its own range; a week can
    // straddle two months, so narrowing from the coarser bucket would drop records.
    fn apply_records(&self, records: &[Record], update: UsedAmountUpdate) -> Self {
        let mut updated = self.clone();
        for period in RepeatingPeriod::COARSE_TO_FINE {
            let bucket = updated.bucket_mut(period);
            let Some(first) = bucket.first() else {
                continue;
            };

            let in_range: Vec<Record> = match first.date_range {
                Some(range) => records
                    .iter()
                    .filter(|record| range.contains(record.date))
                    .cloned()
                    .collect(),
                None => Vec::new(),
            };

            if in_range.is_empty() && update != UsedAmountUpdate::Fill {
                continue;
            }

            for budget in bucket.iter_mut() {
                let delta = budget.total_of(&in_range);
                let used_amount = match update {
                    UsedAmountUpdate::Fill => delta,
                    UsedAmountUpdate::Add => budget.used_amount + delta,
                    UsedAmountUpdate::Subtract => budget.used_amount - delta,
                };
                budget.set_used_amount(used_amount);
            }
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateStamp;
    use chrono::NaiveDate;

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn record(
        account: AccountId,
        category: Option<CategoryId>,
        record_type: RecordType,
        units: i64,
        date: i64,
    ) -> Record {
        let mut record = Record::new(
            1,
            DateStamp::from_raw(date),
            record_type,
            account,
            Money::from_units(units),
        );
        record.category_id = category;
        record
    }

    fn budget(
        period: RepeatingPeriod,
        limit: i64,
        account: AccountId,
        category: Option<CategoryId>,
    ) -> Budget {
        let mut budget = Budget::new("Test", Money::from_units(limit), period);
        budget.linked_account_ids = vec![account];
        budget.category_id = category;
        budget.with_date_range(reference())
    }

    #[test]
    fn test_housing_scenario() {
        let account = AccountId::new();
        let housing = CategoryId::new();
        let budgets = BudgetsByPeriod::from_budgets(vec![budget(
            RepeatingPeriod::Monthly,
            4000,
            account,
            Some(housing),
        )]);

        let records = vec![record(
            account,
            Some(housing),
            RecordType::Expense,
            516,
            202503100900,
        )];
        let filled = budgets.fill_used_amounts_by_records(&records);
        let housing_budget = &filled.monthly[0];
        assert_eq!(housing_budget.used_amount, Money::from_units(516));
        assert!((housing_budget.used_percentage - 12.9).abs() < 1e-9);
    }

    #[test]
    fn test_contribution_rules() {
        let account = AccountId::new();
        let food = CategoryId::new();
        let b = budget(RepeatingPeriod::Monthly, 100, account, Some(food));

        let expense = record(account, Some(food), RecordType::Expense, 10, 202503100900);
        let income = record(account, Some(food), RecordType::Income, 4, 202503100900);
        let transfer = record(account, None, RecordType::OutTransfer, 7, 202503100900);
        let other_account =
            record(AccountId::new(), Some(food), RecordType::Expense, 10, 202503100900);
        let other_category = record(
            account,
            Some(CategoryId::new()),
            RecordType::Expense,
            10,
            202503100900,
        );

        assert_eq!(b.contribution(&expense), Money::from_units(10));
        assert_eq!(b.contribution(&income), Money::from_units(-4));
        assert_eq!(b.contribution(&transfer), Money::zero());
        assert_eq!(b.contribution(&other_account), Money::zero());
        assert_eq!(b.contribution(&other_category), Money::zero());

        let mut by_subcategory = other_category.clone();
        by_subcategory.subcategory_id = Some(food);
        assert_eq!(b.contribution(&by_subcategory), Money::from_units(10));
    }

    #[test]
    fn test_budget_without_category_counts_everything() {
        let account = AccountId::new();
        let b = budget(RepeatingPeriod::Monthly, 100, account, None);
        let r = record(account, Some(CategoryId::new()), RecordType::Expense, 3, 202503100900);
        assert_eq!(b.contribution(&r), Money::from_units(3));
    }

    #[test]
    fn test_zero_limit_has_zero_percentage() {
        let account = AccountId::new();
        let budgets =
            BudgetsByPeriod::from_budgets(vec![budget(RepeatingPeriod::Daily, 0, account, None)]);
        let records = vec![record(account, None, RecordType::Expense, 50, 202503141000)];
        let filled = budgets.fill_used_amounts_by_records(&records);
        assert_eq!(filled.daily[0].used_amount, Money::from_units(50));
        assert_eq!(filled.daily[0].used_percentage, 0.0);
    }

    #[test]
    fn test_fill_matches_incremental_add() {
        let account = AccountId::new();
        let budgets = BudgetsByPeriod::from_budgets(vec![
            budget(RepeatingPeriod::Yearly, 10_000, account, None),
            budget(RepeatingPeriod::Monthly, 1_000, account, None),
            budget(RepeatingPeriod::Weekly, 300, account, None),
            budget(RepeatingPeriod::Daily, 50, account, None),
        ]);
        let records = vec![
            record(account, None, RecordType::Expense, 10, 202501050800),
            record(account, None, RecordType::Expense, 20, 202503030800),
            record(account, None, RecordType::Income, 5, 202503100800),
            record(account, None, RecordType::Expense, 7, 202503141100),
            record(account, None, RecordType::Expense, 9, 202503141500),
        ];

        let filled = budgets.fill_used_amounts_by_records(&records);
        let mut incremental = budgets.fill_used_amounts_by_records(&[]);
        for r in &records {
            incremental = incremental.add_used_amounts_by_records(std::slice::from_ref(r));
        }

        for period in RepeatingPeriod::COARSE_TO_FINE {
            let used = |budgets: &BudgetsByPeriod| -> Vec<Money> {
                budgets.get(period).iter().map(|b| b.used_amount).collect()
            };
            let (expected, actual) = (used(&filled), used(&incremental));
            assert_eq!(expected, actual, "{} bucket", period);
        }

        assert_eq!(filled.yearly[0].used_amount, Money::from_units(41));
        assert_eq!(filled.monthly[0].used_amount, Money::from_units(31));
        assert_eq!(filled.weekly[0].used_amount, Money::from_units(11));
        assert_eq!(filled.daily[0].used_amount, Money::from_units(16));
    }

    #[test]
    fn test_week_crossing_month_boundary_is_not_narrowed() {
        // Week of 2025-03-31 runs to 2025-04-06; the reference is in April
        let april = NaiveDate::from_ymd_opt(2025, 4, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let account = AccountId::new();
        let mut monthly = Budget::new("Month", Money::from_units(100), RepeatingPeriod::Monthly);
        monthly.linked_account_ids = vec![account];
        let mut weekly = Budget::new("Week", Money::from_units(100), RepeatingPeriod::Weekly);
        weekly.linked_account_ids = vec![account];

        let budgets =
            BudgetsByPeriod::from_budgets(vec![monthly, weekly]).with_date_ranges(april);
        let records = vec![record(account, None, RecordType::Expense, 12, 202503311000)];
        let filled = budgets.fill_used_amounts_by_records(&records);
        assert_eq!(filled.monthly[0].used_amount, Money::zero());
        assert_eq!(filled.weekly[0].used_amount, Money::from_units(12));
    }

    #[test]
    fn test_add_then_subtract_restores() {
        let account = AccountId::new();
        let budgets = BudgetsByPeriod::from_budgets(vec![budget(
            RepeatingPeriod::Monthly,
            200,
            account,
            None,
        )]);
        let existing = vec![record(account, None, RecordType::Expense, 40, 202503020800)];
        let filled = budgets.fill_used_amounts_by_records(&existing);

        let new = vec![record(account, None, RecordType::Expense, 15, 202503050800)];
        let after_add = filled.add_used_amounts_by_records(&new);
        assert_eq!(after_add.monthly[0].used_amount, Money::from_units(55));

        let after_subtract = after_add.subtract_used_amounts_by_records(&new);
        assert_eq!(after_subtract, filled);
    }

    #[test]
    fn test_empty_and_out_of_range_deltas_leave_budgets_unchanged() {
        let account = AccountId::new();
        let spent = record(account, None, RecordType::Expense, 40, 202503020800);
        let budgets = BudgetsByPeriod::from_budgets(vec![budget(
            RepeatingPeriod::Monthly,
            200,
            account,
            None,
        )])
        .fill_used_amounts_by_records(&[spent]);

        assert_eq!(budgets.add_used_amounts_by_records(&[]), budgets);
        let old = vec![record(account, None, RecordType::Expense, 99, 202401020800)];
        assert_eq!(budgets.subtract_used_amounts_by_records(&old), budgets);
    }

    #[test]
    fn test_fill_is_idempotent() {
        let account = AccountId::new();
        let budgets = BudgetsByPeriod::from_budgets(vec![budget(
            RepeatingPeriod::Weekly,
            200,
            account,
            None,
        )]);
        let records = vec![record(account, None, RecordType::Expense, 40, 202503120800)];
        let once = budgets.fill_used_amounts_by_records(&records);
        let twice = once.fill_used_amounts_by_records(&records);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_bucket_stays_empty() {
        let budgets = BudgetsByPeriod::default();
        assert!(budgets.are_empty());
        let filled = budgets.fill_used_amounts_by_records(&[]);
        assert!(filled.are_empty());
        assert_eq!(filled.max_date_range(), None);
    }

    #[test]
    fn test_add_budget_uses_own_period_and_priority() {
        let account = AccountId::new();
        let mut budgets = BudgetsByPeriod::default();
        let mut second = budget(RepeatingPeriod::Yearly, 10, account, None);
        second.priority_num = 2;
        let mut first = budget(RepeatingPeriod::Yearly, 10, account, None);
        first.priority_num = 1;

        budgets.add_budget(second.clone());
        budgets.add_budget(first.clone());
        assert!(budgets.daily.is_empty());
        assert_eq!(budgets.yearly[0].id, first.id);
        assert_eq!(budgets.yearly[1].id, second.id);

        assert!(budgets.find_by_id(second.id).is_some());
        assert!(budgets.delete_budget(second.id, RepeatingPeriod::Yearly));
        assert!(!budgets.delete_budget(second.id, RepeatingPeriod::Yearly));
        assert_eq!(budgets.concatenate().len(), 1);
    }

    #[test]
    fn test_max_date_range_prefers_coarsest_bucket() {
        let account = AccountId::new();
        let budgets = BudgetsByPeriod::from_budgets(vec![
            budget(RepeatingPeriod::Daily, 10, account, None),
            budget(RepeatingPeriod::Monthly, 10, account, None),
        ]);
        assert_eq!(
            budgets.max_date_range(),
            Some(RepeatingPeriod::Monthly.range_containing(reference()))
        );
    }

    #[test]
    fn test_used_amounts_by_ranges() {
        let account = AccountId::new();
        let b = budget(RepeatingPeriod::Monthly, 100, account, None);
        let records = vec![
            record(account, None, RecordType::Expense, 5, 202501100800),
            record(account, None, RecordType::Expense, 8, 202503100800),
            record(account, None, RecordType::Expense, 1, 202503110800),
        ];
        let totals = b.used_amounts_by_ranges(&records, reference(), 3);
        let amounts: Vec<Money> = totals.iter().map(|t| t.total_amount).collect();
        assert_eq!(
            amounts,
            vec![Money::from_units(5), Money::zero(), Money::from_units(9)]
        );
    }

    #[test]
    fn test_derived_fields_are_not_persisted() {
        let account = AccountId::new();
        let mut b = budget(RepeatingPeriod::Monthly, 100, account, None);
        b.set_used_amount(Money::from_units(30));
        let json = serde_json::to_value(&b).unwrap();
        assert!(json.get("used_amount").is_none());
        assert!(json.get("date_range").is_none());

        let restored: Budget = serde_json::from_value(json).unwrap();
        assert_eq!(restored.used_amount, Money::zero());
        assert_eq!(restored.date_range, None);
    }
}
