//! Append-only JSONL change history
//!
//! Every local table write and every reconciliation decision lands here as
//! one JSON object per line.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use crate::error::{PocketbookError, PocketbookResult};

use super::entry::AuditEntry;

/// Appends audit entries to the history file and reads them back
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    pub fn log(&self, entry: &AuditEntry) -> PocketbookResult<()> {
        self.log_batch(std::slice::from_ref(entry))
    }

    /// Append entries in order with a single flush
    pub fn log_batch(&self, entries: &[AuditEntry]) -> PocketbookResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| PocketbookError::Io(format!("Failed to open audit log: {}", e)))?;
        let mut writer = BufWriter::new(file);

        for entry in entries {
            serde_json::to_writer(&mut writer, entry).map_err(|e| {
                PocketbookError::Json(format!("Failed to serialize audit entry: {}", e))
            })?;
            writer.write_all(b"\n")?;
        }

        writer
            .flush()
            .map_err(|e| PocketbookError::Io(format!("Failed to flush audit log: {}", e)))
    }

    /// Every entry, oldest first; a missing log reads as empty
    pub fn read_all(&self) -> PocketbookResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| PocketbookError::Io(format!("Failed to open audit log: {}", e)))?;

        BufReader::new(file)
            .lines()
            .enumerate()
            .filter(|(_, line)| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
            .map(|(index, line)| -> PocketbookResult<AuditEntry> {
                let line = line?;
                serde_json::from_str(&line).map_err(|e| {
                    PocketbookError::Json(format!(
                        "Failed to parse audit entry at line {}: {}",
                        index + 1,
                        e
                    ))
                })
            })
            .collect()
    }

    /// The last `count` entries, oldest first
    pub fn read_recent(&self, count: usize) -> PocketbookResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }
}
