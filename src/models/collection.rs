//! Category collections
//!
//! A collection is a named, ordered selection of categories used to group
//! spending on the home screen. Membership lives in its own table of
//! (collection, category) associations.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryCollectionId, CategoryId};
use super::table::{Entity, TableName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CollectionType {
    #[serde(rename = "-")]
    #[default]
    Expense,
    #[serde(rename = "+")]
    Income,
    #[serde(rename = "m")]
    Mixed,
}

impl CollectionType {
    pub fn as_char(&self) -> char {
        match self {
            Self::Expense => '-',
            Self::Income => '+',
            Self::Mixed => 'm',
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "-" | "expense" => Some(Self::Expense),
            "+" | "income" => Some(Self::Income),
            "m" | "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense => write!(f, "Expense"),
            Self::Income => write!(f, "Income"),
            Self::Mixed => write!(f, "Mixed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCollection {
    pub id: CategoryCollectionId,

    #[serde(default)]
    pub order_num: i32,

    #[serde(rename = "type")]
    pub collection_type: CollectionType,

    pub name: String,
}

impl CategoryCollection {
    pub fn new(name: impl Into<String>, collection_type: CollectionType) -> Self {
        Self {
            id: CategoryCollectionId::new(),
            order_num: 0,
            collection_type,
            name: name.into(),
        }
    }
}

impl Entity for CategoryCollection {
    type Key = CategoryCollectionId;

    const TABLE: TableName = TableName::CategoryCollection;

    fn key(&self) -> CategoryCollectionId {
        self.id
    }

    fn document_id(&self) -> String {
        self.id.to_full_string()
    }
}

/// Membership of one category in one collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionCategoryAssociation {
    pub collection_id: CategoryCollectionId,
    pub category_id: CategoryId,
}

impl CollectionCategoryAssociation {
    pub fn new(collection_id: CategoryCollectionId, category_id: CategoryId) -> Self {
        Self {
            collection_id,
            category_id,
        }
    }
}

impl Entity for CollectionCategoryAssociation {
    type Key = (CategoryCollectionId, CategoryId);

    const TABLE: TableName = TableName::CategoryCollectionCategoryAssociation;

    fn key(&self) -> Self::Key {
        (self.collection_id, self.category_id)
    }

    fn document_id(&self) -> String {
        format!(
            "{}-{}",
            self.collection_id.to_full_string(),
            self.category_id.to_full_string()
        )
    }
}

/// A collection together with its member categories
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionWithCategories {
    pub collection: CategoryCollection,
    pub category_ids: Vec<CategoryId>,
}

impl CollectionWithCategories {
    pub fn associations(&self) -> Vec<CollectionCategoryAssociation> {
        self.category_ids
            .iter()
            .map(|category_id| CollectionCategoryAssociation::new(self.collection.id, *category_id))
            .collect()
    }
}
