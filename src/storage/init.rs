//! Storage initialization
//!
//! Handles first-run setup: default categories, every home-screen widget,
//! and every navigation button.
//!
//! Defaults are seeded without an update time. A table that only holds
//! defaults reads as never written, so any remote copy replaces it on the
//! next reconciliation.

use tracing::info;

use crate::error::PocketbookResult;
use crate::models::{Category, CategoryType, NavScreen, NavigationButton, Widget, WidgetName};

use super::LocalStore;

const DEFAULT_EXPENSE_CATEGORIES: &[(&str, &[&str])] = &[
    ("Food & Drinks", &["Groceries", "Restaurants", "Cafe"]),
    ("Housing", &["Rent", "Utilities", "Maintenance"]),
    ("Transport", &["Public transport", "Fuel", "Taxi"]),
    ("Shopping", &["Clothes", "Electronics", "Gifts"]),
    ("Health", &["Pharmacy", "Doctor"]),
    ("Entertainment", &[]),
    ("Other", &[]),
];

const DEFAULT_INCOME_CATEGORIES: &[(&str, &[&str])] = &[
    ("Salary", &["Bonus"]),
    ("Gifts", &[]),
    ("Other", &[]),
];

/// Initialize storage for a fresh installation
///
/// Tables that already hold data are left untouched.
pub fn initialize_storage(store: &LocalStore) -> PocketbookResult<()> {
    store.paths().ensure_directories()?;

    if store.categories().get_all()?.is_empty() {
        let categories = default_categories();
        info!(count = categories.len(), "creating default categories");
        store.categories().seed(&categories)?;
    }

    if store.widgets().get_all()?.is_empty() {
        let widgets: Vec<Widget> = WidgetName::ALL
            .iter()
            .enumerate()
            .map(|(i, name)| Widget {
                name: *name,
                order_num: i as i32 + 1,
            })
            .collect();
        store.widgets().seed(&widgets)?;
    }

    if store.navigation_buttons().get_all()?.is_empty() {
        let buttons: Vec<NavigationButton> = NavScreen::ALL
            .iter()
            .enumerate()
            .map(|(i, screen)| NavigationButton {
                screen: *screen,
                order_num: i as i32 + 1,
            })
            .collect();
        store.navigation_buttons().seed(&buttons)?;
    }

    Ok(())
}

fn default_categories() -> Vec<Category> {
    let mut categories = Vec::new();

    for (category_type, defaults) in [
        (CategoryType::Expense, DEFAULT_EXPENSE_CATEGORIES),
        (CategoryType::Income, DEFAULT_INCOME_CATEGORIES),
    ] {
        for (i, (name, subcategories)) in defaults.iter().enumerate() {
            let mut parent = Category::new(*name, category_type);
            parent.order_num = i as i32 + 1;

            for (j, sub_name) in subcategories.iter().enumerate() {
                let mut sub = Category::subcategory_of(&parent, *sub_name);
                sub.order_num = j as i32 + 1;
                categories.push(sub);
            }
            categories.push(parent);
        }
    }

    categories
}
