//! Category model
//!
//! Categories are two levels deep: top-level categories and their
//! subcategories, linked through `parent_category_id`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::table::{Entity, TableName};

/// Whether a category classifies spending or earnings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    #[default]
    Expense,
    Income,
}

impl CategoryType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "-" => Some(Self::Expense),
            "income" | "+" => Some(Self::Income),
            _ => None,
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense => write!(f, "Expense"),
            Self::Income => write!(f, "Income"),
        }
    }
}

/// A spending or income category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    pub category_type: CategoryType,

    /// Sort order among siblings
    #[serde(default)]
    pub order_num: i32,

    /// Parent category, `None` for top-level categories
    #[serde(default)]
    pub parent_category_id: Option<CategoryId>,

    pub name: String,

    /// Icon name
    #[serde(default)]
    pub icon: String,

    /// Color name
    #[serde(default)]
    pub color: String,
}

impl Category {
    /// Create a new top-level category
    pub fn new(name: impl Into<String>, category_type: CategoryType) -> Self {
        Self {
            id: CategoryId::new(),
            category_type,
            order_num: 0,
            parent_category_id: None,
            name: name.into(),
            icon: String::new(),
            color: String::new(),
        }
    }

    /// Create a subcategory of `parent`, inheriting its type
    pub fn subcategory_of(parent: &Category, name: impl Into<String>) -> Self {
        let mut category = Self::new(name, parent.category_type);
        category.parent_category_id = Some(parent.id);
        category
    }

    pub fn is_subcategory(&self) -> bool {
        self.parent_category_id.is_some()
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        if self.name.len() > 50 {
            return Err(CategoryValidationError::NameTooLong(self.name.len()));
        }

        if self.parent_category_id == Some(self.id) {
            return Err(CategoryValidationError::OwnParent);
        }

        Ok(())
    }
}

impl Entity for Category {
    type Key = CategoryId;

    const TABLE: TableName = TableName::Category;

    fn key(&self) -> CategoryId {
        self.id
    }

    fn document_id(&self) -> String {
        self.id.to_full_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A category paired with one of its subcategories, as selected on a record
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWithSubcategory {
    pub category: Category,
    pub subcategory: Option<Category>,
}

impl CategoryWithSubcategory {
    pub fn new(category: Category, subcategory: Option<Category>) -> Self {
        Self {
            category,
            subcategory,
        }
    }

    /// The most specific category of the pair
    pub fn subcategory_or_category(&self) -> &Category {
        self.subcategory.as_ref().unwrap_or(&self.category)
    }

    /// True when either the category or the subcategory is one of `ids`
    pub fn matches_any(&self, ids: &[CategoryId]) -> bool {
        ids.contains(&self.category.id)
            || self
                .subcategory
                .as_ref()
                .map(|sub| ids.contains(&sub.id))
                .unwrap_or(false)
    }

    /// Sort key placing subcategories right after their parent
    pub fn ordering_key(&self) -> f64 {
        let parent = f64::from(self.category.order_num);
        match &self.subcategory {
            Some(sub) => parent + f64::from(sub.order_num) / 100.0,
            None => parent,
        }
    }

    /// "Parent / Sub" or just the category name
    pub fn label(&self) -> String {
        match &self.subcategory {
            Some(sub) => format!("{} / {}", self.category.name, sub.name),
            None => self.category.name.clone(),
        }
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
    OwnParent,
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Category name too long ({} chars, max 50)", len)
            }
            Self::OwnParent => write!(f, "Category cannot be its own parent"),
        }
    }
}

impl std::error::Error for CategoryValidationError {}
