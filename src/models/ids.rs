//! Strongly-typed ID wrappers for all entity types
//!
//! Every id is a random UUID. The full hyphenated form is what gets stored
//! and used as the remote document id; the display form is a short prefixed
//! tag such as `acc-550e8400`, which commands accept as well.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Full hyphenated form, used as document id and in record notes
            pub fn to_full_string(&self) -> String {
                self.0.to_string()
            }

            /// True when `s` names this id in full, prefixed, or short display form
            pub fn matches(&self, s: &str) -> bool {
                let s = s.trim();
                let bare = s.strip_prefix($display_prefix).unwrap_or(s);
                let full = self.to_full_string();
                bare.eq_ignore_ascii_case(&full)
                    || (bare.len() >= 8 && full.starts_with(&bare.to_ascii_lowercase()))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, &self.to_full_string()[..8])
            }
        }

        /// Parses the full hyphenated form only
        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(AccountId, "acc-");
define_id!(CategoryId, "cat-");
define_id!(CategoryCollectionId, "col-");
define_id!(RecordId, "rec-");
define_id!(BudgetId, "bud-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = AccountId::new();
        let display = format!("{}", id);
        assert!(display.starts_with("acc-"));
        assert_eq!(display.len(), 12);
    }

    #[test]
    fn test_full_string_round_trip() {
        let id = BudgetId::new();
        let parsed: BudgetId = id.to_full_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!(format!("bud-{}", id.to_full_string()).parse::<BudgetId>().is_err());
    }

    #[test]
    fn test_matches() {
        let id: RecordId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        assert!(id.matches("rec-550e8400"));
        assert!(id.matches("550E8400-E29B-41D4-A716-446655440000"));
        assert!(id.matches("rec-550e8400-e29b-41d4-a716-446655440000"));
        assert!(!id.matches("rec-550e"));
        assert!(!id.matches("rec-660e8400"));
    }

    #[test]
    fn test_id_serialization() {
        let id = CategoryId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_full_string()));
    }
}
