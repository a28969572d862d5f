//! Category collection service
//!
//! Collections and their category memberships live in two tables and are
//! always saved together.

use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{
    CategoryCollection, CategoryCollectionId, CategoryId, CollectionCategoryAssociation,
    CollectionType, CollectionWithCategories,
};
use crate::sync::{EntitiesToSync, Repositories};

pub struct CategoryCollectionService<'a> {
    repos: &'a Repositories,
}

impl<'a> CategoryCollectionService<'a> {
    pub fn new(repos: &'a Repositories) -> Self {
        Self { repos }
    }

    /// Create a collection holding `category_ids`
    pub fn create(
        &self,
        name: &str,
        collection_type: CollectionType,
        category_ids: Vec<CategoryId>,
    ) -> PocketbookResult<CollectionWithCategories> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PocketbookError::Validation(
                "Collection name cannot be empty".into(),
            ));
        }

        for id in &category_ids {
            if self.repos.categories.get(id)?.is_none() {
                return Err(PocketbookError::category_not_found(id.to_string()));
            }
        }

        let mut all = self.list_with_categories()?;
        let mut collection = CategoryCollection::new(name, collection_type);
        collection.order_num = all
            .iter()
            .map(|c| c.collection.order_num)
            .max()
            .unwrap_or(0)
            + 1;

        let created = CollectionWithCategories {
            collection,
            category_ids,
        };
        all.push(created.clone());
        self.save_collections(all)?;
        Ok(created)
    }

    /// Every collection with its member category ids, in display order
    pub fn list_with_categories(&self) -> PocketbookResult<Vec<CollectionWithCategories>> {
        let associations = self.repos.collection_categories.get_all()?;
        let mut collections: Vec<CollectionWithCategories> = self
            .repos
            .category_collections
            .get_all()?
            .into_iter()
            .map(|collection| CollectionWithCategories {
                category_ids: associations
                    .iter()
                    .filter(|a| a.collection_id == collection.id)
                    .map(|a| a.category_id)
                    .collect(),
                collection,
            })
            .collect();
        collections.sort_by_key(|c| c.collection.order_num);
        Ok(collections)
    }

    /// Replace every collection and membership with `collections`
    pub fn save_collections(
        &self,
        collections: Vec<CollectionWithCategories>,
    ) -> PocketbookResult<()> {
        let desired_collections: Vec<CategoryCollection> =
            collections.iter().map(|c| c.collection.clone()).collect();
        let desired_associations: Vec<CollectionCategoryAssociation> = collections
            .iter()
            .flat_map(CollectionWithCategories::associations)
            .collect();

        let collection_change = EntitiesToSync::between(
            &self.repos.category_collections.get_all()?,
            &desired_collections,
        );
        let association_change = EntitiesToSync::between(
            &self.repos.collection_categories.get_all()?,
            &desired_associations,
        );

        self.repos
            .category_collections
            .delete_and_upsert(&collection_change)?;
        self.repos
            .collection_categories
            .delete_and_upsert(&association_change)
    }

    pub fn delete(&self, id: CategoryCollectionId) -> PocketbookResult<()> {
        let collections = self.list_with_categories()?;
        if !collections.iter().any(|c| c.collection.id == id) {
            return Err(PocketbookError::NotFound {
                entity_type: "Category collection",
                identifier: id.to_string(),
            });
        }

        self.save_collections(
            collections
                .into_iter()
                .filter(|c| c.collection.id != id)
                .collect(),
        )
    }
}
