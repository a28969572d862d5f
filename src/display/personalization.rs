//! Widget and navigation display formatting

use crate::models::{CheckedWidget, NavigationButton};

/// Format widgets as a checklist
pub fn format_widget_list(widgets: &[CheckedWidget]) -> String {
    widgets
        .iter()
        .map(|widget| {
            format!(
                "[{}] {}\n",
                if widget.is_checked { "x" } else { " " },
                widget.name
            )
        })
        .collect()
}

/// Format the navigation bar left to right
pub fn format_navigation_bar(buttons: &[NavigationButton]) -> String {
    let names: Vec<String> = buttons.iter().map(|b| b.screen.to_string()).collect();
    format!("{}\n", names.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NavScreen, WidgetName};

    #[test]
    fn test_format_widget_list() {
        let widgets = [
            CheckedWidget {
                name: WidgetName::RecentRecords,
                is_checked: true,
            },
            CheckedWidget {
                name: WidgetName::ChosenBudgets,
                is_checked: false,
            },
        ];
        assert_eq!(
            format_widget_list(&widgets),
            "[x] Recent records\n[ ] Chosen budgets\n"
        );
    }

    #[test]
    fn test_format_navigation_bar() {
        let buttons = [
            NavigationButton {
                screen: NavScreen::Home,
                order_num: 1,
            },
            NavigationButton {
                screen: NavScreen::Budgets,
                order_num: 2,
            },
        ];
        assert_eq!(format_navigation_bar(&buttons), "Home | Budgets\n");
    }
}
