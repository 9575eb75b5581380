//! Dotted-path partial updates.
//!
//! The host persistence API takes updates keyed by dotted paths into the
//! document. A last segment of `-=<key>` removes that key. The overlay store
//! mirrors each successful write by applying the same update locally, so
//! both sides share this implementation.

use serde_json::{Map, Value};

use super::engine::DELETION_PREFIX;
use crate::errors::{GrimoireError, Result};

/// A partial document keyed by dotted paths
pub type PathedUpdate = Map<String, Value>;

/// Build a single-entry update
pub fn single(path: impl Into<String>, value: Value) -> PathedUpdate {
    let mut update = PathedUpdate::new();
    update.insert(path.into(), value);
    update
}

/// Join path segments with `.`
pub fn join(base: &str, key: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", base, key)
    }
}

/// Look up the value at a dotted path
pub fn get_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|s| !s.is_empty())
        .try_fold(doc, |current, segment| current.as_object()?.get(segment))
}

/// Remove and return the value at a dotted path
pub fn take_path(doc: &mut Value, path: &str) -> Option<Value> {
    let (parent, last) = match path.rsplit_once('.') {
        Some((parent, last)) => (navigate_mut(doc, parent)?, last),
        None => (doc, path),
    };
    parent.as_object_mut()?.remove(last)
}

fn navigate_mut<'a>(doc: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    path.split('.')
        .filter(|s| !s.is_empty())
        .try_fold(doc, |current, segment| current.as_object_mut()?.get_mut(segment))
}

/// Apply a pathed update to `doc` in place.
///
/// - `a.b.-=c` removes `c` from the object at `a.b`; a missing parent is a no-op
/// - `a.b.c` creates missing intermediate objects, then merges an object
///   value into an existing object (recursively) or replaces the value
/// - keys nested inside written values are stored literally
///
/// # Errors
///
/// Returns `InvalidPath` when a path is empty or an intermediate segment
/// holds a non-object value.
pub fn apply_pathed_update(doc: &mut Value, update: &PathedUpdate) -> Result<()> {
    for (path, value) in update {
        apply_one(doc, path, value)?;
    }
    Ok(())
}

fn apply_one(doc: &mut Value, path: &str, value: &Value) -> Result<()> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(GrimoireError::InvalidPath {
            path: path.to_string(),
            reason: "path contains an empty segment".to_string(),
        });
    }
    let Some((last, parents)) = segments.split_last() else {
        return Err(GrimoireError::InvalidPath {
            path: path.to_string(),
            reason: "path is empty".to_string(),
        });
    };

    if let Some(name) = last.strip_prefix(DELETION_PREFIX) {
        let parent_path = parents.join(".");
        let parent = if parent_path.is_empty() {
            Some(doc)
        } else {
            navigate_mut(doc, &parent_path)
        };
        if let Some(Value::Object(map)) = parent {
            map.remove(name);
        }
        return Ok(());
    }

    let mut current = doc;
    for segment in parents {
        let map = as_object_or_err(current, path)?;
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let map = as_object_or_err(current, path)?;
    match (map.get_mut(*last), value) {
        (Some(Value::Object(existing)), Value::Object(incoming)) => {
            merge_literal(existing, incoming);
        }
        _ => {
            map.insert(last.to_string(), value.clone());
        }
    }
    Ok(())
}

fn as_object_or_err<'a>(value: &'a mut Value, path: &str) -> Result<&'a mut Map<String, Value>> {
    if value.is_null() {
        *value = Value::Object(Map::new());
    }
    value.as_object_mut().ok_or_else(|| GrimoireError::InvalidPath {
        path: path.to_string(),
        reason: "intermediate segment is not an object".to_string(),
    })
}

fn merge_literal(target: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (key, value) in incoming {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(inner)) => merge_literal(existing, inner),
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}
