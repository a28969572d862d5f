//! Audit entry data structures
//!
//! Defines the structure of audit log entries: which table was touched, what
//! kind of change was made, and the entity as it was written or removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::TableName;

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Entity was inserted or replaced
    Upsert,
    /// Entity was removed
    Delete,
    /// Local table was replaced by the remote copy
    Pull,
    /// Remote table was replaced by the local copy
    Push,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Upsert => write!(f, "UPSERT"),
            Operation::Delete => write!(f, "DELETE"),
            Operation::Pull => write!(f, "PULL"),
            Operation::Push => write!(f, "PUSH"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    pub table: TableName,

    /// Document id of the affected entity; empty for table-level entries
    #[serde(default)]
    pub entity_id: String,

    /// The entity as written (upserts) or as it was before removal (deletes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Human-readable summary, used by table-level entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl AuditEntry {
    pub fn upsert<T: Serialize>(
        table: TableName,
        entity_id: impl Into<String>,
        entity: &T,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Upsert,
            table,
            entity_id: entity_id.into(),
            data: serde_json::to_value(entity).ok(),
            summary: None,
        }
    }

    pub fn delete<T: Serialize>(
        table: TableName,
        entity_id: impl Into<String>,
        entity: &T,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Delete,
            table,
            entity_id: entity_id.into(),
            data: serde_json::to_value(entity).ok(),
            summary: None,
        }
    }

    /// Table-level entry describing a reconciliation decision
    pub fn reconciled(table: TableName, operation: Operation, summary: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            table,
            entity_id: String::new(),
            data: None,
            summary: Some(summary.into()),
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.table,
        );

        if !self.entity_id.is_empty() {
            output.push_str(&format!(" {}", self.entity_id));
        }

        if let Some(summary) = &self.summary {
            output.push_str(&format!(": {}", summary));
        }

        output
    }
}
