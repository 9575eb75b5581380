use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::predicate::Predicate;
use crate::errors::Result;

/// RuleElementSource - the persisted declaration of one rule element
///
/// `type` selects the kind; older data spells it `key`. Fields this struct
/// does not name are kept in `extra` for the kind to interpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleElementSource {
    /// Kind discriminator, e.g. "TokenLight"
    #[serde(rename = "type", alias = "key")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Conditions tested against the actor's roll options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Predicate>,

    /// Evaluation order; lower runs first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    /// Skip this element entirely
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ignored: bool,

    /// Kind-specific payload
    #[serde(default)]
    pub value: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RuleElementSource {
    /// Parse a deep copy of a raw rule source
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the source lacks a kind or a field has
    /// the wrong shape.
    pub fn from_value(raw: &Value) -> Result<Self> {
        Ok(serde_json::from_value(raw.clone())?)
    }

    /// Priority, falling back to `default` when unset
    pub fn priority_or(&self, default: i32) -> i32 {
        self.priority.unwrap_or(default)
    }
}
