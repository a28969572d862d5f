//! Error type shared by every layer of pocketbook
//!
//! Local store failures surface as `Storage`/`Io`, remote store failures as
//! `Remote`. Neither is retried.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PocketbookError {
    /// Settings or paths could not be resolved
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    /// User input or entity invariants rejected
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Name already taken within its scope
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    #[error("Budget error: {0}")]
    Budget(String),

    /// Reconciliation could not decide or apply a direction
    #[error("Sync error: {0}")]
    Sync(String),

    #[error("Remote store error: {0}")]
    Remote(String),

    /// A table file or the update-time ledger failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl PocketbookError {
    fn not_found(entity_type: &'static str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            identifier: identifier.into(),
        }
    }

    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::not_found("Account", identifier)
    }

    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::not_found("Category", identifier)
    }

    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::not_found("Budget", identifier)
    }

    pub fn record_not_found(identifier: impl Into<String>) -> Self {
        Self::not_found("Record", identifier)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True for failures of the remote document store
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl From<std::io::Error> for PocketbookError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PocketbookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

pub type PocketbookResult<T> = Result<T, PocketbookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_display() {
        let err = PocketbookError::Duplicate {
            entity_type: "Category",
            identifier: "Food & Drinks".into(),
        };
        assert_eq!(err.to_string(), "Category already exists: Food & Drinks");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_error() {
        let err = PocketbookError::account_not_found("Checking");
        assert_eq!(err.to_string(), "Account not found: Checking");
        assert!(err.is_not_found());
        assert!(!err.is_remote());
    }

    #[test]
    fn test_remote_error() {
        let err = PocketbookError::Remote("connection refused".into());
        assert_eq!(err.to_string(), "Remote store error: connection refused");
        assert!(err.is_remote());
    }

    #[test]
    fn test_conversions() {
        let err: PocketbookError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into();
        assert!(matches!(err, PocketbookError::Io(_)));

        let err: PocketbookError = serde_json::from_str::<u32>("[").unwrap_err().into();
        assert!(matches!(err, PocketbookError::Json(_)));
    }
}
