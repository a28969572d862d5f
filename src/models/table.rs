//! Table identities shared by the local and remote stores
//!
//! Every persisted entity type belongs to exactly one table. The table name
//! keys the update-time ledger on both sides; the collection name is the
//! remote sub-collection the entities live in.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TableName {
    Account,
    Category,
    CategoryCollection,
    CategoryCollectionCategoryAssociation,
    Record,
    Budget,
    BudgetOnWidget,
    Widget,
    NavigationButton,
}

impl TableName {
    /// Reconciliation order: referenced tables before the tables that reference them
    pub const SYNC_ORDER: [TableName; 9] = [
        Self::Account,
        Self::Category,
        Self::CategoryCollection,
        Self::CategoryCollectionCategoryAssociation,
        Self::Record,
        Self::Budget,
        Self::BudgetOnWidget,
        Self::Widget,
        Self::NavigationButton,
    ];

    /// Stable name used as the ledger key
    pub fn name(&self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::Category => "Category",
            Self::CategoryCollection => "CategoryCollection",
            Self::CategoryCollectionCategoryAssociation => "CategoryCollectionCategoryAssociation",
            Self::Record => "Record",
            Self::Budget => "Budget",
            Self::BudgetOnWidget => "BudgetOnWidget",
            Self::Widget => "Widget",
            Self::NavigationButton => "NavigationButton",
        }
    }

    /// File stem of the local JSON file
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::Account => "accounts",
            Self::Category => "categories",
            Self::CategoryCollection => "category_collections",
            Self::CategoryCollectionCategoryAssociation => "collection_categories",
            Self::Record => "records",
            Self::Budget => "budgets",
            Self::BudgetOnWidget => "budgets_on_widgets",
            Self::Widget => "widgets",
            Self::NavigationButton => "navigation_buttons",
        }
    }

    /// Remote sub-collection holding one document per entity
    pub fn collection_name(&self) -> &'static str {
        match self {
            Self::Account => "accounts",
            Self::Category => "categories",
            Self::CategoryCollection => "categoryCollections",
            Self::CategoryCollectionCategoryAssociation => "categoryCollectionCategoryAssociations",
            Self::Record => "records",
            Self::Budget => "budgets",
            Self::BudgetOnWidget => "budgetsOnWidgets",
            Self::Widget => "widgets",
            Self::NavigationButton => "navigationButtons",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A persisted value object with identity
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned {
    type Key: Clone + Eq + Hash + fmt::Debug;

    const TABLE: TableName;

    fn key(&self) -> Self::Key;

    /// Key rendered as a document id for the remote store
    fn document_id(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashSet};

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = TableName::SYNC_ORDER.iter().map(|t| t.name()).collect();
        let stems: HashSet<_> = TableName::SYNC_ORDER.iter().map(|t| t.file_stem()).collect();
        let collections: HashSet<_> = TableName::SYNC_ORDER
            .iter()
            .map(|t| t.collection_name())
            .collect();
        assert_eq!(names.len(), 9);
        assert_eq!(stems.len(), 9);
        assert_eq!(collections.len(), 9);
    }

    #[test]
    fn test_serializes_as_map_key() {
        let mut ledger = BTreeMap::new();
        ledger.insert(TableName::Record, 100_i64);
        let json = serde_json::to_string(&ledger).unwrap();
        assert_eq!(json, r#"{"Record":100}"#);
    }
}
