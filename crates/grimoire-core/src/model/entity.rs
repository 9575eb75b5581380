use serde_json::{Map, Value};

use crate::diff::path;
use crate::errors::{GrimoireError, Result};

/// BaseEntity - the canonical persisted document subject to overlays
///
/// `source` is the document exactly as persisted, including the overlay
/// map. It is only ever changed by mirroring a successful persistence write.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseEntity {
    /// Document id (`_id`)
    pub id: String,

    /// Display name (`name`)
    pub name: String,

    /// Document kind (`type`), e.g. "spell"
    pub kind: String,

    /// Full persisted source
    pub source: Value,
}

impl BaseEntity {
    /// Build an entity from its persisted source
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the source is not an object or lacks a
    /// string `_id`.
    pub fn from_source(source: Value) -> Result<Self> {
        let obj = source.as_object().ok_or_else(|| GrimoireError::Serialization {
            message: "entity source must be a JSON object".to_string(),
        })?;
        let id = obj
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| GrimoireError::Serialization {
                message: "entity source has no string `_id`".to_string(),
            })?
            .to_string();
        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            id,
            name,
            kind,
            source,
        })
    }

    /// The raw overlay map stored at `overlays_path`, if any
    pub fn overlay_source(&self, overlays_path: &str) -> Option<&Map<String, Value>> {
        path::get_path(&self.source, overlays_path).and_then(Value::as_object)
    }

    /// A deep copy of the source with the overlay map removed
    ///
    /// Variants are derived from and diffed against this view so overlay
    /// bookkeeping never leaks into a variant or a stored diff.
    pub fn resolved_source(&self, overlays_path: &str) -> Value {
        let mut copy = self.source.clone();
        path::take_path(&mut copy, overlays_path);
        copy
    }
}

/// Construction/validation contract of a document kind
///
/// The materializer rejects any combined variant this contract refuses.
pub trait EntitySchema: Send + Sync {
    /// Validate a fully combined document source
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the source is not a valid
    /// document of this kind.
    fn validate(&self, source: &Value) -> std::result::Result<(), String>;
}

/// Schema accepting any JSON object
#[derive(Debug, Clone, Copy, Default)]
pub struct AnySchema;

impl EntitySchema for AnySchema {
    fn validate(&self, source: &Value) -> std::result::Result<(), String> {
        if source.is_object() {
            Ok(())
        } else {
            Err("document must be an object".to_string())
        }
    }
}

/// Minimal spell document contract
///
/// Checks the fields the overlay engine and the sample tooling rely on:
/// - `_id` and `name` are non-empty strings and `type` is "spell"
/// - `data`, when present, is an object
/// - `data.level.value`, when present, is an integer in 1..=10
/// - `data.traits.value`, when present, is an array of strings
#[derive(Debug, Clone, Copy, Default)]
pub struct SpellSchema;

impl EntitySchema for SpellSchema {
    fn validate(&self, source: &Value) -> std::result::Result<(), String> {
        let obj = source
            .as_object()
            .ok_or_else(|| "spell must be an object".to_string())?;

        for key in ["_id", "name"] {
            match obj.get(key).and_then(Value::as_str) {
                Some(s) if !s.trim().is_empty() => {}
                _ => return Err(format!("spell `{}` must be a non-empty string", key)),
            }
        }

        if obj.get("type").and_then(Value::as_str) != Some("spell") {
            return Err("spell `type` must be \"spell\"".to_string());
        }

        let Some(data) = obj.get("data") else {
            return Ok(());
        };
        let data = data
            .as_object()
            .ok_or_else(|| "spell `data` must be an object".to_string())?;

        if let Some(level) = data.get("level").and_then(|l| l.get("value")) {
            match level.as_u64() {
                Some(n) if (1..=10).contains(&n) => {}
                _ => return Err(format!("spell level must be an integer 1-10, got {}", level)),
            }
        }

        if let Some(traits) = data.get("traits").and_then(|t| t.get("value")) {
            let valid = traits
                .as_array()
                .is_some_and(|values| values.iter().all(Value::is_string));
            if !valid {
                return Err("spell traits must be an array of strings".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fireball() -> Value {
        json!({
            "_id": "spell1",
            "name": "Fireball",
            "type": "spell",
            "data": {
                "level": {"value": 3},
                "traits": {"value": ["fire", "evocation"]},
                "overlays": {"o1": {"_id": "o1", "sort": 1, "overlayType": "override"}}
            }
        })
    }

    #[test]
    fn test_from_source_reads_identity() {
        let entity = BaseEntity::from_source(fireball()).unwrap();
        assert_eq!(entity.id, "spell1");
        assert_eq!(entity.name, "Fireball");
        assert_eq!(entity.kind, "spell");
    }

    #[test]
    fn test_from_source_requires_id() {
        let err = BaseEntity::from_source(json!({"name": "x"})).unwrap_err();
        assert!(matches!(err, GrimoireError::Serialization { .. }));
    }

    #[test]
    fn test_resolved_source_strips_overlays() {
        let entity = BaseEntity::from_source(fireball()).unwrap();
        let resolved = entity.resolved_source("data.overlays");
        assert!(resolved["data"].get("overlays").is_none());
        assert!(entity.overlay_source("data.overlays").is_some());
        assert_eq!(resolved["data"]["level"]["value"], 3);
    }

    #[test]
    fn test_spell_schema_accepts_valid_spell() {
        assert!(SpellSchema.validate(&fireball()).is_ok());
    }

    #[test]
    fn test_spell_schema_rejects_out_of_range_level() {
        let mut spell = fireball();
        spell["data"]["level"]["value"] = json!(11);
        assert!(SpellSchema.validate(&spell).is_err());
    }

    #[test]
    fn test_spell_schema_rejects_wrong_type() {
        let mut spell = fireball();
        spell["type"] = json!("feat");
        assert!(SpellSchema.validate(&spell).is_err());
    }

    #[test]
    fn test_any_schema_rejects_non_objects() {
        assert!(AnySchema.validate(&json!([1, 2])).is_err());
        assert!(AnySchema.validate(&json!({})).is_ok());
    }
}
