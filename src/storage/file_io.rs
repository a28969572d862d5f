//! JSON file helpers
//!
//! Local tables, the update-time ledger, and the directory remote store all
//! go through these. Writes land in a sibling temp file that is synced and
//! renamed over the target, so a crash leaves either the old or the new
//! contents.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::PocketbookError;

fn storage_error(action: &str, path: &Path, err: impl std::fmt::Display) -> PocketbookError {
    PocketbookError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T, PocketbookError> {
    let file = File::open(path).map_err(|e| storage_error("open", path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| storage_error("parse", path, e))
}

/// Read JSON from a file, or `T::default()` when the file does not exist
pub fn read_json<T, P>(path: P) -> Result<T, PocketbookError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.exists() {
        parse_file(path)
    } else {
        Ok(T::default())
    }
}

/// Read JSON from a file that must exist
pub fn read_json_required<T, P>(path: P) -> Result<T, PocketbookError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Err(PocketbookError::Storage(format!(
            "File not found: {}",
            path.display()
        )));
    }
    parse_file(path)
}

/// Write JSON to `path` through a synced temp file and a rename
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), PocketbookError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_error("create directory", parent, e))?;
    }

    // The temp file must live next to the target for the rename to be atomic.
    let temp_path = path.with_extension("json.tmp");
    let file = File::create(&temp_path).map_err(|e| storage_error("create", &temp_path, e))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| storage_error("serialize", path, e))?;
    writer
        .flush()
        .and_then(|_| writer.get_ref().sync_all())
        .map_err(|e| storage_error("sync", &temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        storage_error("replace", path, e)
    })
}

/// Remove a file, treating a missing file as success
pub fn remove_file_if_exists<P: AsRef<Path>>(path: P) -> Result<(), PocketbookError> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(storage_error("remove", path, e)),
        _ => Ok(()),
    }
}
