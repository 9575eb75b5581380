//! JSON-file persistence for a single document.
//!
//! Each update is read-modify-write with a temp→rename swap so a crash
//! never leaves a partially written document behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use super::{DocumentPersistence, UpdateOptions};
use crate::diff::{apply_pathed_update, PathedUpdate};
use crate::errors::{GrimoireError, Result};

/// [`DocumentPersistence`] over one pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    /// Persist to the document stored at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, document_id: &str, action: &str, err: impl std::fmt::Display) -> GrimoireError {
        GrimoireError::Persistence {
            document_id: document_id.to_string(),
            message: format!("{} {}: {}", action, self.path.display(), err),
        }
    }

    async fn read(&self, document_id: &str) -> Result<Value> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| self.io_error(document_id, "read", e))?;
        let doc: Value = serde_json::from_slice(&bytes)?;

        let stored_id = doc.get("_id").and_then(Value::as_str);
        if stored_id != Some(document_id) {
            return Err(GrimoireError::Persistence {
                document_id: document_id.to_string(),
                message: format!(
                    "{} holds document {:?}",
                    self.path.display(),
                    stored_id.unwrap_or("<none>")
                ),
            });
        }
        Ok(doc)
    }

    async fn write(&self, document_id: &str, doc: &Value) -> Result<()> {
        let content = serde_json::to_vec_pretty(doc)?;
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, content)
            .await
            .map_err(|e| self.io_error(document_id, "write", e))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.io_error(document_id, "rename", e))
    }
}

#[async_trait]
impl DocumentPersistence for FilePersistence {
    async fn update(
        &self,
        document_id: &str,
        changes: PathedUpdate,
        _options: UpdateOptions,
    ) -> Result<()> {
        let mut doc = self.read(document_id).await?;
        apply_pathed_update(&mut doc, &changes)?;
        tracing::debug!(
            document_id,
            path = %self.path.display(),
            keys = changes.len(),
            "writing document"
        );
        self.write(document_id, &doc).await
    }

    async fn fetch(&self, document_id: &str) -> Result<Value> {
        self.read(document_id).await
    }
}
