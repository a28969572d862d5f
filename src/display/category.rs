//! Category display formatting
//!
//! Formats the category tree and category collections for terminal output.

use crate::models::{Category, CategoryType, CategoryWithSubcategory, CollectionWithCategories};

/// Format categories as a tree, one section per category type
pub fn format_category_tree(pairs: &[CategoryWithSubcategory]) -> String {
    if pairs.is_empty() {
        return "No categories found.\n\nRun 'pocketbook init' to create default categories."
            .to_string();
    }

    let mut output = String::new();

    for category_type in [CategoryType::Expense, CategoryType::Income] {
        let section: Vec<&CategoryWithSubcategory> = pairs
            .iter()
            .filter(|pair| pair.category.category_type == category_type)
            .collect();
        if section.is_empty() {
            continue;
        }

        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&format!("{}\n", category_type));

        for (i, pair) in section.iter().enumerate() {
            match &pair.subcategory {
                None => output.push_str(&format!("  {}\n", pair.category.name)),
                Some(sub) => {
                    let is_last = section
                        .get(i + 1)
                        .map_or(true, |next| next.subcategory.is_none());
                    let prefix = if is_last { "└── " } else { "├── " };
                    output.push_str(&format!("    {}{}\n", prefix, sub.name));
                }
            }
        }
    }

    output
}

/// Format collections with the names of their member categories
pub fn format_collection_list(
    collections: &[CollectionWithCategories],
    categories: &[Category],
) -> String {
    if collections.is_empty() {
        return "No category collections found.".to_string();
    }

    let mut output = String::new();
    for collection in collections {
        let names: Vec<&str> = collection
            .category_ids
            .iter()
            .filter_map(|id| categories.iter().find(|c| c.id == *id))
            .map(|c| c.name.as_str())
            .collect();
        output.push_str(&format!(
            "{} [{}]: {}\n",
            collection.collection.name,
            collection.collection.collection_type.as_char(),
            if names.is_empty() {
                "(empty)".to_string()
            } else {
                names.join(", ")
            }
        ));
    }
    output
}
