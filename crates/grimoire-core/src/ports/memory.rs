//! In-memory persistence that records every call.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{DocumentPersistence, UpdateOptions};
use crate::diff::{apply_pathed_update, PathedUpdate};
use crate::errors::{GrimoireError, Result};

/// One update call as received
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpdate {
    pub document_id: String,
    pub changes: PathedUpdate,
    pub options: UpdateOptions,
}

/// HashMap-backed [`DocumentPersistence`]
///
/// Records every update, including rejected ones, and can be told to fail
/// a specific call to exercise partial-failure paths.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    documents: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<RecordedUpdate>>,
    fail_call: Mutex<Option<usize>>,
}

impl MemoryPersistence {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with one document keyed by its `_id`
    pub fn with_document(source: Value) -> Self {
        let store = Self::new();
        store.insert(source);
        store
    }

    /// Insert or replace a document keyed by its `_id`
    pub fn insert(&self, source: Value) {
        let id = source
            .get("_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if let Ok(mut docs) = self.documents.lock() {
            docs.insert(id, source);
        }
    }

    /// Current persisted source of a document
    pub fn document(&self, document_id: &str) -> Option<Value> {
        self.documents
            .lock()
            .ok()
            .and_then(|docs| docs.get(document_id).cloned())
    }

    /// All update calls received so far
    pub fn calls(&self) -> Vec<RecordedUpdate> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of update calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    /// Fail the update call with this zero-based index
    pub fn fail_on_call(&self, index: usize) {
        if let Ok(mut fail) = self.fail_call.lock() {
            *fail = Some(index);
        }
    }

    fn persistence_error(document_id: &str, message: impl Into<String>) -> GrimoireError {
        GrimoireError::Persistence {
            document_id: document_id.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl DocumentPersistence for MemoryPersistence {
    async fn update(
        &self,
        document_id: &str,
        changes: PathedUpdate,
        options: UpdateOptions,
    ) -> Result<()> {
        let index = {
            let mut calls = self
                .calls
                .lock()
                .map_err(|_| Self::persistence_error(document_id, "call log poisoned"))?;
            calls.push(RecordedUpdate {
                document_id: document_id.to_string(),
                changes: changes.clone(),
                options,
            });
            calls.len() - 1
        };

        let should_fail = self
            .fail_call
            .lock()
            .map(|fail| *fail == Some(index))
            .unwrap_or(false);
        if should_fail {
            return Err(Self::persistence_error(document_id, "injected failure"));
        }

        let mut docs = self
            .documents
            .lock()
            .map_err(|_| Self::persistence_error(document_id, "document map poisoned"))?;
        let doc = docs
            .get_mut(document_id)
            .ok_or_else(|| Self::persistence_error(document_id, "no such document"))?;
        apply_pathed_update(doc, &changes)
    }

    async fn fetch(&self, document_id: &str) -> Result<Value> {
        self.document(document_id)
            .ok_or_else(|| Self::persistence_error(document_id, "no such document"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::path::single;
    use serde_json::json;

    #[tokio::test]
    async fn test_update_applies_and_records() {
        let store = MemoryPersistence::with_document(json!({"_id": "s1", "name": "Light"}));
        store
            .update("s1", single("data.level", json!(1)), UpdateOptions::default())
            .await
            .unwrap();

        assert_eq!(store.call_count(), 1);
        assert_eq!(store.document("s1").unwrap()["data"]["level"], 1);
    }

    #[tokio::test]
    async fn test_injected_failure_leaves_document_untouched() {
        let store = MemoryPersistence::with_document(json!({"_id": "s1"}));
        store.fail_on_call(0);
        let err = store
            .update("s1", single("name", json!("x")), UpdateOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GrimoireError::Persistence { .. }));
        assert_eq!(store.document("s1").unwrap(), json!({"_id": "s1"}));
        assert_eq!(store.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_missing_document_fails() {
        let store = MemoryPersistence::new();
        assert!(store.fetch("nope").await.is_err());
    }
}
