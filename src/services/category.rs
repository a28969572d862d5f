//! Category service
//!
//! Provides business logic for the two-level category tree: top-level
//! categories of one type, each with optional subcategories.

use std::collections::HashSet;

use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{
    Category, CategoryId, CategoryType, CategoryWithSubcategory, CollectionCategoryAssociation,
};
use crate::sync::{EntitiesToSync, Repositories};

/// Service for category management
pub struct CategoryService<'a> {
    repos: &'a Repositories,
}

impl<'a> CategoryService<'a> {
    /// Create a new category service
    pub fn new(repos: &'a Repositories) -> Self {
        Self { repos }
    }

    /// Create a category, or a subcategory when `parent_id` is given
    ///
    /// A subcategory always takes its parent's type.
    pub fn create(
        &self,
        name: &str,
        category_type: CategoryType,
        parent_id: Option<CategoryId>,
    ) -> PocketbookResult<Category> {
        let name = name.trim();
        let categories = self.repos.categories.get_all()?;

        let mut category = match parent_id {
            Some(parent_id) => {
                let parent = categories
                    .iter()
                    .find(|c| c.id == parent_id)
                    .ok_or_else(|| PocketbookError::category_not_found(parent_id.to_string()))?;
                if parent.is_subcategory() {
                    return Err(PocketbookError::Validation(format!(
                        "'{}' is already a subcategory",
                        parent.name
                    )));
                }
                Category::subcategory_of(parent, name)
            }
            None => Category::new(name, category_type),
        };

        let siblings: Vec<&Category> = categories
            .iter()
            .filter(|c| {
                c.parent_category_id == category.parent_category_id
                    && c.category_type == category.category_type
            })
            .collect();

        if siblings.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
            return Err(PocketbookError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }

        category.order_num = siblings.iter().map(|c| c.order_num).max().unwrap_or(0) + 1;
        category
            .validate()
            .map_err(|e| PocketbookError::Validation(e.to_string()))?;

        self.repos.categories.upsert(std::slice::from_ref(&category))?;
        Ok(category)
    }

    pub fn get(&self, id: CategoryId) -> PocketbookResult<Option<Category>> {
        self.repos.categories.get(&id)
    }

    /// Find a category by name (case-insensitive) or ID string
    pub fn find(&self, identifier: &str) -> PocketbookResult<Option<Category>> {
        let categories = self.repos.categories.get_all()?;
        if let Some(category) = categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(identifier))
        {
            return Ok(Some(category.clone()));
        }

        Ok(categories.iter().find(|c| c.id.matches(identifier)).cloned())
    }

    /// All categories, parents in order with their subcategories after them
    pub fn list(&self) -> PocketbookResult<Vec<Category>> {
        Ok(self
            .with_subcategories(None)?
            .into_iter()
            .map(|pair| pair.subcategory_or_category().clone())
            .collect())
    }

    /// Every selectable (category, subcategory) pair, optionally of one type
    pub fn with_subcategories(
        &self,
        category_type: Option<CategoryType>,
    ) -> PocketbookResult<Vec<CategoryWithSubcategory>> {
        let categories = self.repos.categories.get_all()?;
        let mut pairs = Vec::new();

        for parent in categories.iter().filter(|c| {
            !c.is_subcategory() && category_type.map_or(true, |t| c.category_type == t)
        }) {
            pairs.push(CategoryWithSubcategory::new(parent.clone(), None));
            pairs.extend(
                categories
                    .iter()
                    .filter(|c| c.parent_category_id == Some(parent.id))
                    .map(|sub| CategoryWithSubcategory::new(parent.clone(), Some(sub.clone()))),
            );
        }

        pairs.sort_by(|a, b| {
            a.category
                .category_type
                .cmp(&b.category.category_type)
                .then(a.ordering_key().total_cmp(&b.ordering_key()))
        });
        Ok(pairs)
    }

    /// Replace the stored category list with `categories`
    pub fn save_categories(&self, categories: Vec<Category>) -> PocketbookResult<()> {
        for category in &categories {
            category
                .validate()
                .map_err(|e| PocketbookError::Validation(e.to_string()))?;
        }

        let current = self.repos.categories.get_all()?;
        let change = EntitiesToSync::between(&current, &categories);
        if change.to_delete.is_empty() {
            self.repos.categories.upsert(&change.to_upsert)
        } else {
            self.repos.categories.delete_and_upsert(&change)
        }
    }

    /// Delete a category together with its subcategories
    ///
    /// Collection memberships of the deleted categories go with them.
    pub fn delete(&self, id: CategoryId) -> PocketbookResult<Vec<Category>> {
        let categories = self.repos.categories.get_all()?;
        if !categories.iter().any(|c| c.id == id) {
            return Err(PocketbookError::category_not_found(id.to_string()));
        }

        let (removed, kept): (Vec<Category>, Vec<Category>) = categories
            .into_iter()
            .partition(|c| c.id == id || c.parent_category_id == Some(id));
        let removed_ids: HashSet<CategoryId> = removed.iter().map(|c| c.id).collect();

        let associations: Vec<CollectionCategoryAssociation> = self
            .repos
            .collection_categories
            .get_all()?
            .into_iter()
            .filter(|a| removed_ids.contains(&a.category_id))
            .collect();
        if !associations.is_empty() {
            self.repos
                .collection_categories
                .delete_and_upsert(&EntitiesToSync::delete_only(associations))?;
        }

        self.save_categories(kept)?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PocketbookPaths;
    use crate::models::CategoryCollectionId;
    use crate::storage::LocalStore;
    use tempfile::TempDir;

    fn create_test_repos() -> (TempDir, Repositories) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PocketbookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = LocalStore::new(paths).unwrap();
        (temp_dir, Repositories::local_only(&store))
    }

    #[test]
    fn test_create_category_and_subcategory() {
        let (_temp_dir, repos) = create_test_repos();
        let service = CategoryService::new(&repos);

        let salary = service.create("Salary", CategoryType::Income, None).unwrap();
        let bonus = service
            .create("Bonus", CategoryType::Expense, Some(salary.id))
            .unwrap();

        assert_eq!(bonus.parent_category_id, Some(salary.id));
        assert_eq!(bonus.category_type, CategoryType::Income);
        assert_eq!(bonus.order_num, 1);
    }

    #[test]
    fn test_no_third_level() {
        let (_temp_dir, repos) = create_test_repos();
        let service = CategoryService::new(&repos);

        let food = service.create("Food", CategoryType::Expense, None).unwrap();
        let cafe = service
            .create("Cafe", CategoryType::Expense, Some(food.id))
            .unwrap();
        let result = service.create("Espresso", CategoryType::Expense, Some(cafe.id));

        assert!(result.unwrap_err().is_validation());
    }

    #[test]
    fn test_duplicate_among_siblings_only() {
        let (_temp_dir, repos) = create_test_repos();
        let service = CategoryService::new(&repos);

        let food = service.create("Food", CategoryType::Expense, None).unwrap();
        let housing = service.create("Housing", CategoryType::Expense, None).unwrap();
        service
            .create("Other", CategoryType::Expense, Some(food.id))
            .unwrap();
        service
            .create("Other", CategoryType::Expense, Some(housing.id))
            .unwrap();

        let result = service.create("food", CategoryType::Expense, None);
        assert!(matches!(result, Err(PocketbookError::Duplicate { .. })));
    }

    #[test]
    fn test_with_subcategories_order() {
        let (_temp_dir, repos) = create_test_repos();
        let service = CategoryService::new(&repos);

        let food = service.create("Food", CategoryType::Expense, None).unwrap();
        let housing = service.create("Housing", CategoryType::Expense, None).unwrap();
        service
            .create("Rent", CategoryType::Expense, Some(housing.id))
            .unwrap();
        service
            .create("Cafe", CategoryType::Expense, Some(food.id))
            .unwrap();
        service.create("Salary", CategoryType::Income, None).unwrap();

        let labels: Vec<String> = service
            .with_subcategories(Some(CategoryType::Expense))
            .unwrap()
            .iter()
            .map(CategoryWithSubcategory::label)
            .collect();
        assert_eq!(labels, vec!["Food", "Food / Cafe", "Housing", "Housing / Rent"]);
        assert_eq!(service.list().unwrap().len(), 5);
    }

    #[test]
    fn test_delete_removes_subcategories_and_memberships() {
        let (_temp_dir, repos) = create_test_repos();
        let service = CategoryService::new(&repos);

        let food = service.create("Food", CategoryType::Expense, None).unwrap();
        let cafe = service
            .create("Cafe", CategoryType::Expense, Some(food.id))
            .unwrap();
        let other = service.create("Other", CategoryType::Expense, None).unwrap();
        repos
            .collection_categories
            .upsert(&[CollectionCategoryAssociation::new(
                CategoryCollectionId::new(),
                cafe.id,
            )])
            .unwrap();

        let removed = service.delete(food.id).unwrap();

        assert_eq!(removed.len(), 2);
        assert_eq!(repos.categories.get_all().unwrap(), vec![other]);
        assert!(repos.collection_categories.get_all().unwrap().is_empty());
    }
}
