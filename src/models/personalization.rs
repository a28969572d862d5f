//! Home-screen widgets, bottom navigation buttons, and pinned budgets

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::BudgetId;
use super::table::{Entity, TableName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WidgetName {
    ChosenBudgets,
    TotalForPeriod,
    RecentRecords,
    TopExpenseCategories,
}

impl WidgetName {
    /// Every widget in default display order
    pub const ALL: [WidgetName; 4] = [
        Self::ChosenBudgets,
        Self::TotalForPeriod,
        Self::RecentRecords,
        Self::TopExpenseCategories,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase().replace(['-', '_', ' '], "");
        Self::ALL
            .into_iter()
            .find(|name| format!("{:?}", name).to_lowercase() == wanted)
    }
}

impl fmt::Display for WidgetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChosenBudgets => write!(f, "Chosen budgets"),
            Self::TotalForPeriod => write!(f, "Total for period"),
            Self::RecentRecords => write!(f, "Recent records"),
            Self::TopExpenseCategories => write!(f, "Top expense categories"),
        }
    }
}

/// A widget shown on the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widget {
    pub name: WidgetName,
    pub order_num: i32,
}

impl Entity for Widget {
    type Key = WidgetName;

    const TABLE: TableName = TableName::Widget;

    fn key(&self) -> WidgetName {
        self.name
    }

    fn document_id(&self) -> String {
        format!("{:?}", self.name)
    }
}

/// Widget with its visibility, as presented in the settings list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckedWidget {
    pub name: WidgetName,
    pub is_checked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NavScreen {
    Home,
    Records,
    CategoryStatistics,
    Budgets,
    Settings,
}

impl NavScreen {
    pub const ALL: [NavScreen; 5] = [
        Self::Home,
        Self::Records,
        Self::CategoryStatistics,
        Self::Budgets,
        Self::Settings,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase().replace(['-', '_', ' '], "");
        Self::ALL
            .into_iter()
            .find(|screen| format!("{:?}", screen).to_lowercase() == wanted)
    }
}

impl fmt::Display for NavScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "Home"),
            Self::Records => write!(f, "Records"),
            Self::CategoryStatistics => write!(f, "Category statistics"),
            Self::Budgets => write!(f, "Budgets"),
            Self::Settings => write!(f, "Settings"),
        }
    }
}

/// A button in the bottom navigation bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationButton {
    pub screen: NavScreen,
    pub order_num: i32,
}

impl Entity for NavigationButton {
    type Key = NavScreen;

    const TABLE: TableName = TableName::NavigationButton;

    fn key(&self) -> NavScreen {
        self.screen
    }

    fn document_id(&self) -> String {
        format!("{:?}", self.screen)
    }
}

/// A budget pinned to the chosen-budgets widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetOnWidget {
    pub budget_id: BudgetId,
}

impl Entity for BudgetOnWidget {
    type Key = BudgetId;

    const TABLE: TableName = TableName::BudgetOnWidget;

    fn key(&self) -> BudgetId {
        self.budget_id
    }

    fn document_id(&self) -> String {
        self.budget_id.to_full_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_name_parse() {
        assert_eq!(WidgetName::parse("recent-records"), Some(WidgetName::RecentRecords));
        assert_eq!(WidgetName::parse("ChosenBudgets"), Some(WidgetName::ChosenBudgets));
        assert_eq!(
            WidgetName::parse("top expense categories"),
            Some(WidgetName::TopExpenseCategories)
        );
        assert_eq!(WidgetName::parse("weather"), None);
        assert_eq!(NavScreen::parse("category-statistics"), Some(NavScreen::CategoryStatistics));
    }

    #[test]
    fn test_document_ids() {
        let widget = Widget {
            name: WidgetName::TotalForPeriod,
            order_num: 1,
        };
        assert_eq!(widget.document_id(), "TotalForPeriod");

        let button = NavigationButton {
            screen: NavScreen::Budgets,
            order_num: 3,
        };
        assert_eq!(button.document_id(), "Budgets");
    }
}
