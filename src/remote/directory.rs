//! Remote store backed by a directory tree
//!
//! Maps the remote key structure onto plain JSON files:
//!
//! ```text
//! {root}/user_data/{user}/{collection}/{document}.json
//! {root}/user_data/{user}/UpdateTime/{table}.json
//! ```
//!
//! Pointing several installations at a shared directory gives them one
//! remote copy to reconcile against.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{PocketbookError, PocketbookResult};
use crate::models::TableName;
use crate::storage::file_io::{read_json_required, remove_file_if_exists, write_json_atomic};

use super::{Document, DocumentBatch, RemoteStore, UpdateTimeDocument, UPDATE_TIME_COLLECTION};

#[derive(Debug, Clone)]
pub struct DirectoryRemoteStore {
    root: PathBuf,
}

impl DirectoryRemoteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, user_id: &str, collection: &str) -> PocketbookResult<PathBuf> {
        Ok(self
            .root
            .join("user_data")
            .join(path_segment(user_id)?)
            .join(path_segment(collection)?))
    }

    fn document_path(
        &self,
        user_id: &str,
        collection: &str,
        document_id: &str,
    ) -> PocketbookResult<PathBuf> {
        Ok(self
            .collection_dir(user_id, collection)?
            .join(format!("{}.json", path_segment(document_id)?)))
    }
}

/// Reject keys that would escape their directory
fn path_segment(segment: &str) -> PocketbookResult<&str> {
    let valid = !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && segment != "."
        && segment != "..";
    if valid {
        Ok(segment)
    } else {
        Err(PocketbookError::Remote(format!(
            "Invalid remote key segment: '{}'",
            segment
        )))
    }
}

fn remote_error(e: PocketbookError) -> PocketbookError {
    match e {
        PocketbookError::Remote(_) => e,
        other => PocketbookError::Remote(other.to_string()),
    }
}

impl RemoteStore for DirectoryRemoteStore {
    fn get_update_time(&self, user_id: &str, table: TableName) -> PocketbookResult<Option<i64>> {
        let path = self.document_path(user_id, UPDATE_TIME_COLLECTION, table.name())?;
        if !path.exists() {
            return Ok(None);
        }
        let document: UpdateTimeDocument = read_json_required(&path).map_err(remote_error)?;
        Ok(Some(document.timestamp))
    }

    fn save_update_time(
        &self,
        user_id: &str,
        table: TableName,
        timestamp: i64,
    ) -> PocketbookResult<()> {
        let path = self.document_path(user_id, UPDATE_TIME_COLLECTION, table.name())?;
        let document = UpdateTimeDocument {
            table_name: table.name().to_string(),
            timestamp,
        };
        write_json_atomic(&path, &document).map_err(remote_error)
    }

    fn get_documents(&self, user_id: &str, collection: &str) -> PocketbookResult<Vec<Document>> {
        let dir = self.collection_dir(user_id, collection)?;
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|e| {
            PocketbookError::Remote(format!("Failed to list {}: {}", dir.display(), e))
        })?;

        let mut documents = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| PocketbookError::Remote(format!("Failed to read entry: {}", e)))?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let data: Value = read_json_required(&path).map_err(remote_error)?;
            documents.push(Document {
                id: id.to_string(),
                data,
            });
        }

        documents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(documents)
    }

    fn write_batch(
        &self,
        user_id: &str,
        collection: &str,
        batch: &DocumentBatch,
    ) -> PocketbookResult<()> {
        for id in &batch.delete {
            let path = self.document_path(user_id, collection, id)?;
            remove_file_if_exists(&path).map_err(remote_error)?;
        }
        for document in &batch.upsert {
            let path = self.document_path(user_id, collection, &document.id)?;
            write_json_atomic(&path, &document.data).map_err(remote_error)?;
        }
        Ok(())
    }
}
