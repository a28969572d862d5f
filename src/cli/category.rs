//! Category CLI commands
//!
//! Implements CLI commands for categories, subcategories, and category
//! collections. Categories are addressed as "Name" or "Parent/Sub".

use clap::Subcommand;

use crate::display::category::{format_category_tree, format_collection_list};
use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{CategoryType, CategoryWithSubcategory, CollectionType};
use crate::services::{CategoryCollectionService, CategoryService};
use crate::sync::Repositories;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories as a tree
    List {
        /// Only show one type ("expense" or "income")
        #[arg(short = 't', long = "type")]
        category_type: Option<String>,
    },

    /// Create a category, or a subcategory with --parent
    Add {
        /// Category name
        name: String,
        /// Create an income category
        #[arg(short, long)]
        income: bool,
        /// Parent category name
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Delete a category and its subcategories
    Delete {
        /// Category as "Name" or "Parent/Sub"
        category: String,
        /// Look the category up among income categories
        #[arg(short, long)]
        income: bool,
    },

    /// List category collections
    Collections,

    /// Create a category collection
    Collect {
        /// Collection name
        name: String,
        /// Collection type ("expense", "income" or "mixed")
        #[arg(short = 't', long = "type", default_value = "mixed")]
        collection_type: String,
        /// Member categories as "Name" or "Parent/Sub"
        categories: Vec<String>,
    },
}

fn parse_category_type(input: &str) -> PocketbookResult<CategoryType> {
    CategoryType::parse(input).ok_or_else(|| {
        PocketbookError::Validation(format!(
            "Invalid category type: '{}'. Valid types: expense, income",
            input
        ))
    })
}

fn type_flag(income: bool) -> CategoryType {
    if income {
        CategoryType::Income
    } else {
        CategoryType::Expense
    }
}

/// Resolve "Name" or "Parent/Sub" to a selectable category pair
///
/// Names are matched case-insensitively; with no type filter expense
/// categories are searched first.
pub(crate) fn resolve_category(
    repos: &Repositories,
    category_type: Option<CategoryType>,
    path: &str,
) -> PocketbookResult<CategoryWithSubcategory> {
    let (parent_name, sub_name) = match path.split_once('/') {
        Some((parent, sub)) => (parent.trim(), Some(sub.trim())),
        None => (path.trim(), None),
    };

    CategoryService::new(repos)
        .with_subcategories(category_type)?
        .into_iter()
        .find(|pair| {
            pair.category.name.eq_ignore_ascii_case(parent_name)
                && match (&pair.subcategory, sub_name) {
                    (None, None) => true,
                    (Some(sub), Some(name)) => sub.name.eq_ignore_ascii_case(name),
                    _ => false,
                }
        })
        .ok_or_else(|| PocketbookError::category_not_found(path))
}

/// Handle a category command
pub fn handle_category_command(
    repos: &Repositories,
    cmd: CategoryCommands,
) -> PocketbookResult<()> {
    let service = CategoryService::new(repos);

    match cmd {
        CategoryCommands::List { category_type } => {
            let category_type = category_type
                .as_deref()
                .map(parse_category_type)
                .transpose()?;
            let pairs = service.with_subcategories(category_type)?;
            print!("{}", format_category_tree(&pairs));
        }

        CategoryCommands::Add {
            name,
            income,
            parent,
        } => {
            let category_type = type_flag(income);
            let parent = parent
                .map(|p| resolve_category(repos, Some(category_type), &p))
                .transpose()?;
            let category = service.create(
                &name,
                category_type,
                parent.as_ref().map(|pair| pair.category.id),
            )?;

            match parent {
                Some(pair) => println!(
                    "Created subcategory: {} / {}",
                    pair.category.name, category.name
                ),
                None => println!("Created {} category: {}", category.category_type, category.name),
            }
        }

        CategoryCommands::Delete { category, income } => {
            let pair = resolve_category(repos, Some(type_flag(income)), &category)?;
            let removed = service.delete(pair.subcategory_or_category().id)?;
            println!("Deleted category: {}", pair.label());
            if removed.len() > 1 {
                println!("  Removed {} subcategories", removed.len() - 1);
            }
        }

        CategoryCommands::Collections => {
            let collections = CategoryCollectionService::new(repos).list_with_categories()?;
            let categories = service.list()?;
            print!("{}", format_collection_list(&collections, &categories));
        }

        CategoryCommands::Collect {
            name,
            collection_type,
            categories,
        } => {
            let collection_type = CollectionType::parse(&collection_type).ok_or_else(|| {
                PocketbookError::Validation(format!(
                    "Invalid collection type: '{}'. Valid types: expense, income, mixed",
                    collection_type
                ))
            })?;
            let category_type = match collection_type {
                CollectionType::Expense => Some(CategoryType::Expense),
                CollectionType::Income => Some(CategoryType::Income),
                CollectionType::Mixed => None,
            };
            let category_ids = categories
                .iter()
                .map(|path| {
                    resolve_category(repos, category_type, path)
                        .map(|pair| pair.subcategory_or_category().id)
                })
                .collect::<PocketbookResult<Vec<_>>>()?;

            let created = CategoryCollectionService::new(repos).create(
                &name,
                collection_type,
                category_ids,
            )?;
            println!(
                "Created collection: {} ({} categories)",
                created.collection.name,
                created.category_ids.len()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PocketbookPaths;
    use crate::storage::LocalStore;
    use tempfile::TempDir;

    fn create_test_repos() -> (TempDir, Repositories) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PocketbookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = LocalStore::new(paths).unwrap();
        (temp_dir, Repositories::local_only(&store))
    }

    #[test]
    fn test_resolve_category_path() {
        let (_temp_dir, repos) = create_test_repos();
        let service = CategoryService::new(&repos);
        let food = service.create("Food", CategoryType::Expense, None).unwrap();
        let cafe = service.create("Cafe", CategoryType::Expense, Some(food.id)).unwrap();
        service.create("Other", CategoryType::Expense, None).unwrap();
        let other_income = service.create("Other", CategoryType::Income, None).unwrap();

        let pair = resolve_category(&repos, None, "food / CAFE").unwrap();
        assert_eq!(pair.category.id, food.id);
        assert_eq!(pair.subcategory.map(|s| s.id), Some(cafe.id));

        let pair = resolve_category(&repos, Some(CategoryType::Income), "Other").unwrap();
        assert_eq!(pair.category.id, other_income.id);

        let err = resolve_category(&repos, None, "Food/Bakery").unwrap_err();
        assert!(err.is_not_found());
    }
}
