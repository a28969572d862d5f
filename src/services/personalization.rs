//! Home-screen and navigation personalisation
//!
//! The widget table holds only the widgets shown on the home screen, in
//! display order. Widgets missing from it are hidden.

use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{
    Budget, BudgetId, BudgetOnWidget, CheckedWidget, NavScreen, NavigationButton, Widget,
    WidgetName,
};
use crate::sync::{EntitiesToSync, Repositories};

pub struct PersonalizationService<'a> {
    repos: &'a Repositories,
}

impl<'a> PersonalizationService<'a> {
    pub fn new(repos: &'a Repositories) -> Self {
        Self { repos }
    }

    /// Every widget: shown ones in display order, then the hidden ones
    pub fn widgets(&self) -> PocketbookResult<Vec<CheckedWidget>> {
        let mut shown = self.repos.widgets.get_all()?;
        shown.sort_by_key(|widget| widget.order_num);

        let mut widgets: Vec<CheckedWidget> = shown
            .iter()
            .map(|widget| CheckedWidget {
                name: widget.name,
                is_checked: true,
            })
            .collect();
        widgets.extend(
            WidgetName::ALL
                .into_iter()
                .filter(|name| !shown.iter().any(|widget| widget.name == *name))
                .map(|name| CheckedWidget {
                    name,
                    is_checked: false,
                }),
        );
        Ok(widgets)
    }

    /// Store the checked widgets in the given order
    pub fn save_widgets(&self, widgets: &[CheckedWidget]) -> PocketbookResult<()> {
        let desired: Vec<Widget> = widgets
            .iter()
            .filter(|widget| widget.is_checked)
            .enumerate()
            .map(|(i, widget)| Widget {
                name: widget.name,
                order_num: i as i32 + 1,
            })
            .collect();

        let change = EntitiesToSync::between(&self.repos.widgets.get_all()?, &desired);
        self.repos.widgets.delete_and_upsert(&change)
    }

    /// Show or hide one widget; a newly shown widget goes last
    pub fn set_widget(&self, name: WidgetName, is_checked: bool) -> PocketbookResult<()> {
        let mut widgets = self.widgets()?;
        widgets.retain(|widget| widget.name != name);
        let position = widgets.iter().filter(|widget| widget.is_checked).count();
        widgets.insert(position, CheckedWidget { name, is_checked });
        self.save_widgets(&widgets)
    }

    /// Move a shown widget to `position` among the shown widgets
    pub fn move_widget(&self, name: WidgetName, position: usize) -> PocketbookResult<()> {
        let mut shown: Vec<CheckedWidget> = self
            .widgets()?
            .into_iter()
            .filter(|widget| widget.is_checked)
            .collect();
        let from = shown
            .iter()
            .position(|widget| widget.name == name)
            .ok_or_else(|| PocketbookError::Validation(format!("Widget '{}' is hidden", name)))?;

        let widget = shown.remove(from);
        shown.insert(position.min(shown.len()), widget);
        self.save_widgets(&shown)
    }

    /// Navigation buttons in display order
    pub fn navigation_buttons(&self) -> PocketbookResult<Vec<NavigationButton>> {
        let mut buttons = self.repos.navigation_buttons.get_all()?;
        buttons.sort_by_key(|button| button.order_num);
        Ok(buttons)
    }

    /// Store `screens` as the navigation bar, in order
    pub fn save_navigation_buttons(&self, screens: &[NavScreen]) -> PocketbookResult<()> {
        let desired: Vec<NavigationButton> = screens
            .iter()
            .enumerate()
            .map(|(i, screen)| NavigationButton {
                screen: *screen,
                order_num: i as i32 + 1,
            })
            .collect();

        let change =
            EntitiesToSync::between(&self.repos.navigation_buttons.get_all()?, &desired);
        self.repos.navigation_buttons.delete_and_upsert(&change)
    }

    /// Exchange the positions of two buttons
    pub fn swap_navigation_buttons(
        &self,
        first: NavScreen,
        second: NavScreen,
    ) -> PocketbookResult<()> {
        let mut screens: Vec<NavScreen> = self
            .navigation_buttons()?
            .into_iter()
            .map(|button| button.screen)
            .collect();

        let a = screens.iter().position(|s| *s == first);
        let b = screens.iter().position(|s| *s == second);
        match (a, b) {
            (Some(a), Some(b)) => {
                screens.swap(a, b);
                self.save_navigation_buttons(&screens)
            }
            _ => Err(PocketbookError::Validation(format!(
                "'{}' and '{}' must both be on the navigation bar",
                first, second
            ))),
        }
    }

    /// Budgets pinned to the chosen-budgets widget, in budget order
    pub fn budgets_on_widget(&self) -> PocketbookResult<Vec<Budget>> {
        let pinned = self.repos.budgets_on_widgets.get_all()?;
        let mut budgets: Vec<Budget> = self
            .repos
            .budgets
            .get_all()?
            .into_iter()
            .filter(|budget| pinned.iter().any(|pin| pin.budget_id == budget.id))
            .collect();
        budgets.sort_by_key(|budget| (budget.repeating_period, budget.priority_num));
        Ok(budgets)
    }

    pub fn save_budgets_on_widget(&self, budget_ids: &[BudgetId]) -> PocketbookResult<()> {
        for id in budget_ids {
            if self.repos.budgets.get(id)?.is_none() {
                return Err(PocketbookError::budget_not_found(id.to_string()));
            }
        }

        let desired: Vec<BudgetOnWidget> = budget_ids
            .iter()
            .map(|budget_id| BudgetOnWidget {
                budget_id: *budget_id,
            })
            .collect();
        let change =
            EntitiesToSync::between(&self.repos.budgets_on_widgets.get_all()?, &desired);
        self.repos.budgets_on_widgets.delete_and_upsert(&change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PocketbookPaths;
    use crate::models::{Money, RepeatingPeriod};
    use crate::storage::{initialize_storage, LocalStore};
    use tempfile::TempDir;

    fn create_test_repos() -> (TempDir, Repositories) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PocketbookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = LocalStore::new(paths).unwrap();
        initialize_storage(&store).unwrap();
        (temp_dir, Repositories::local_only(&store))
    }

    fn names(widgets: &[CheckedWidget]) -> Vec<(WidgetName, bool)> {
        widgets.iter().map(|w| (w.name, w.is_checked)).collect()
    }

    #[test]
    fn test_hide_and_show_widget() {
        let (_temp_dir, repos) = create_test_repos();
        let service = PersonalizationService::new(&repos);
        assert!(service.widgets().unwrap().iter().all(|w| w.is_checked));

        service.set_widget(WidgetName::TotalForPeriod, false).unwrap();
        assert_eq!(
            names(&service.widgets().unwrap()),
            vec![
                (WidgetName::ChosenBudgets, true),
                (WidgetName::RecentRecords, true),
                (WidgetName::TopExpenseCategories, true),
                (WidgetName::TotalForPeriod, false),
            ]
        );
        assert_eq!(repos.widgets.get_all().unwrap().len(), 3);

        service.set_widget(WidgetName::TotalForPeriod, true).unwrap();
        assert_eq!(service.widgets().unwrap()[3].name, WidgetName::TotalForPeriod);
        assert!(service.widgets().unwrap()[3].is_checked);
    }

    #[test]
    fn test_move_widget() {
        let (_temp_dir, repos) = create_test_repos();
        let service = PersonalizationService::new(&repos);

        service.move_widget(WidgetName::TopExpenseCategories, 0).unwrap();
        assert_eq!(service.widgets().unwrap()[0].name, WidgetName::TopExpenseCategories);

        service.set_widget(WidgetName::RecentRecords, false).unwrap();
        assert!(service
            .move_widget(WidgetName::RecentRecords, 0)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_swap_navigation_buttons() {
        let (_temp_dir, repos) = create_test_repos();
        let service = PersonalizationService::new(&repos);

        service
            .swap_navigation_buttons(NavScreen::Home, NavScreen::Settings)
            .unwrap();

        let screens: Vec<NavScreen> = service
            .navigation_buttons()
            .unwrap()
            .into_iter()
            .map(|b| b.screen)
            .collect();
        assert_eq!(screens.first(), Some(&NavScreen::Settings));
        assert_eq!(screens.last(), Some(&NavScreen::Home));

        service
            .save_navigation_buttons(&[NavScreen::Home, NavScreen::Budgets])
            .unwrap();
        assert_eq!(service.navigation_buttons().unwrap().len(), 2);
        assert!(service
            .swap_navigation_buttons(NavScreen::Home, NavScreen::Records)
            .is_err());
    }

    #[test]
    fn test_budgets_on_widget() {
        let (_temp_dir, repos) = create_test_repos();
        let service = PersonalizationService::new(&repos);
        let monthly = Budget::new("Monthly", Money::from_units(100), RepeatingPeriod::Monthly);
        let daily = Budget::new("Daily", Money::from_units(10), RepeatingPeriod::Daily);
        repos.budgets.upsert(&[monthly.clone(), daily.clone()]).unwrap();

        service
            .save_budgets_on_widget(&[monthly.id, daily.id])
            .unwrap();
        let pinned: Vec<String> = service
            .budgets_on_widget()
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(pinned, vec!["Daily", "Monthly"]);

        service.save_budgets_on_widget(&[monthly.id]).unwrap();
        assert_eq!(repos.budgets_on_widgets.get_all().unwrap().len(), 1);
        assert!(service
            .save_budgets_on_widget(&[BudgetId::new()])
            .unwrap_err()
            .is_not_found());
    }
}
