//! Budget display formatting
//!
//! Budgets are shown grouped by period, each with its current range, used
//! amount against the limit, and a usage bar.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Budget, BudgetsByPeriod, RepeatingPeriod, TotalAmountByRange};

use super::format::{format_bar, format_percentage, truncate};

const BAR_WIDTH: usize = 20;

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "Period")]
    period: RepeatingPeriod,
    #[tabled(rename = "Budget")]
    name: String,
    #[tabled(rename = "Range")]
    range: String,
    #[tabled(rename = "Used")]
    used: String,
    #[tabled(rename = "Limit")]
    limit: String,
    #[tabled(rename = "%")]
    percentage: String,
    #[tabled(rename = "")]
    bar: String,
}

impl From<&Budget> for BudgetRow {
    fn from(budget: &Budget) -> Self {
        Self {
            period: budget.repeating_period,
            name: truncate(&budget.name, 24),
            range: budget
                .date_range
                .map(|range| range.to_string())
                .unwrap_or_default(),
            used: budget.used_amount.format_with_spaces(),
            limit: budget.amount_limit.format_with_spaces(),
            percentage: format_percentage(budget.used_percentage),
            bar: format_bar(budget.used_percentage, 100.0, BAR_WIDTH),
        }
    }
}

/// Format budgets, coarsest period first
pub fn format_budget_table(budgets: &BudgetsByPeriod) -> String {
    if budgets.are_empty() {
        return "No budgets found.\n".to_string();
    }

    let rows: Vec<BudgetRow> = RepeatingPeriod::COARSE_TO_FINE
        .iter()
        .flat_map(|period| budgets.get(*period))
        .map(BudgetRow::from)
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Format the used amount of one budget over consecutive ranges
pub fn format_budget_statistics(budget: &Budget, totals: &[TotalAmountByRange]) -> String {
    let mut output = format!(
        "{} ({}, limit {})\n",
        budget.name,
        budget.repeating_period,
        budget.amount_limit.format_with_spaces()
    );

    let limit = budget.amount_limit.cents() as f64;
    let widest = totals
        .iter()
        .map(|t| t.total_amount.cents() as f64)
        .fold(limit, f64::max);

    for total in totals {
        output.push_str(&format!(
            "  {:<23} {:>14}  {}\n",
            total.date_range.to_string(),
            total.total_amount.format_with_spaces(),
            format_bar(total.total_amount.cents() as f64, widest, BAR_WIDTH),
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateStamp, Money};

    #[test]
    fn test_format_budget_table() {
        let reference = DateStamp::parse("2024-03-20").unwrap().to_datetime().unwrap();
        let mut budget = Budget::new("Housing", Money::from_units(4000), RepeatingPeriod::Monthly)
            .with_date_range(reference);
        budget.set_used_amount(Money::from_units(516));
        let budgets = BudgetsByPeriod::from_budgets(vec![budget]);

        let output = format_budget_table(&budgets);
        assert!(output.contains("Housing"));
        assert!(output.contains("2024-03-01..2024-03-31"));
        assert!(output.contains("516.00"));
        assert!(output.contains("12.9%"));
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(
            format_budget_table(&BudgetsByPeriod::default()),
            "No budgets found.\n"
        );
    }

    #[test]
    fn test_format_statistics() {
        let budget = Budget::new("Food", Money::from_units(100), RepeatingPeriod::Weekly);
        let reference = DateStamp::parse("2024-03-20").unwrap().to_datetime().unwrap();
        let totals: Vec<TotalAmountByRange> = RepeatingPeriod::Weekly
            .ranges_ending_at(reference, 2)
            .into_iter()
            .map(|date_range| TotalAmountByRange {
                date_range,
                total_amount: Money::from_units(50),
            })
            .collect();

        let output = format_budget_statistics(&budget, &totals);
        assert!(output.starts_with("Food (Weekly, limit 100.00)"));
        assert!(output.contains("2024-03-18..2024-03-24"));
        assert_eq!(output.lines().count(), 3);
    }
}
