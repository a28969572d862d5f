//! Change history for pocketbook
//!
//! Records every local table write and every reconciliation decision in an
//! append-only audit log.
//!
//! - `AuditEntry`: one change, with the table, operation, and entity JSON.
//! - `AuditLogger`: appends entries to the log file as line-delimited JSON
//!   (JSONL) and reads them back.

mod entry;
mod logger;

pub use entry::{AuditEntry, Operation};
pub use logger::AuditLogger;
