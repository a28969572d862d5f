//! Synchronization report formatting

use crate::services::SyncReport;

pub fn format_sync_report(report: &SyncReport) -> String {
    let mut output = String::new();
    for (table, outcome) in &report.tables {
        output.push_str(&format!("  {:<40} {}\n", table.to_string(), outcome));
    }
    output
}
