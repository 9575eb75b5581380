use std::convert::Infallible;
use std::str::FromStr;

use grimoire_core_types::OverlayId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diff::Patch;
use crate::errors::{GrimoireError, Result};

/// Bookkeeping keys of a record; never part of the document patch
pub const RECORD_KEYS: [&str; 3] = ["_id", "sort", "overlayType"];

/// Kind of an overlay record
///
/// Only `override` has behavior. Records of any other kind are kept as
/// [`OverlayType::Other`] so they stay indexed and answer `get_type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OverlayType {
    /// Replaces fields of the base document
    Override,
    /// A kind this crate has no behavior for
    Other(String),
}

impl OverlayType {
    /// Wire name of this kind
    pub fn as_str(&self) -> &str {
        match self {
            OverlayType::Override => "override",
            OverlayType::Other(name) => name,
        }
    }
}

impl std::fmt::Display for OverlayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for OverlayType {
    fn from(s: &str) -> Self {
        match s {
            "override" => OverlayType::Override,
            other => OverlayType::Other(other.to_string()),
        }
    }
}

impl From<String> for OverlayType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "override" => OverlayType::Override,
            _ => OverlayType::Other(s),
        }
    }
}

impl From<OverlayType> for String {
    fn from(kind: OverlayType) -> Self {
        match kind {
            OverlayType::Override => "override".to_string(),
            OverlayType::Other(name) => name,
        }
    }
}

impl FromStr for OverlayType {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Infallible> {
        Ok(OverlayType::from(s))
    }
}

/// One persisted overlay: bookkeeping plus a partial document
///
/// Serialized flat: `{ "_id", "sort", "overlayType", ...body }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayRecord {
    #[serde(rename = "_id")]
    pub id: OverlayId,

    /// 1-based creation position among override records; gaps allowed
    #[serde(default)]
    pub sort: u32,

    #[serde(rename = "overlayType")]
    pub overlay_type: OverlayType,

    /// Patch applied onto the base document
    #[serde(flatten)]
    pub body: Patch,
}

impl OverlayRecord {
    /// Create a record, dropping any bookkeeping keys from `body`
    pub fn new(id: OverlayId, sort: u32, overlay_type: OverlayType, mut body: Patch) -> Self {
        for key in RECORD_KEYS {
            body.remove(key);
        }
        Self {
            id,
            sort,
            overlay_type,
            body,
        }
    }

    /// Parse the record stored under `key`
    ///
    /// # Errors
    ///
    /// Returns `InvalidOverlayRecord` when the value is malformed or its
    /// `_id` differs from `key`. Unknown kinds parse as [`OverlayType::Other`].
    pub fn from_stored(key: &str, value: &Value) -> Result<Self> {
        let record: OverlayRecord =
            serde_json::from_value(value.clone()).map_err(|e| GrimoireError::InvalidOverlayRecord {
                overlay_id: key.to_string(),
                reason: e.to_string(),
            })?;
        if record.id.as_str() != key {
            return Err(GrimoireError::InvalidOverlayRecord {
                overlay_id: key.to_string(),
                reason: format!("record `_id` is {}", record.id),
            });
        }
        Ok(record)
    }

    /// The flat on-disk shape
    pub fn to_stored(&self) -> Value {
        let mut out = self.body.clone();
        out.insert("_id".to_string(), Value::String(self.id.to_string()));
        out.insert("sort".to_string(), Value::from(self.sort));
        out.insert(
            "overlayType".to_string(),
            Value::String(self.overlay_type.to_string()),
        );
        Value::Object(out)
    }
}
