//! Variant materialization.
//!
//! A variant is the base document with one or more overlay records applied
//! in order. Variants are built on demand and never persisted whole.

use std::collections::BTreeMap;

use grimoire_core_types::OverlayId;
use serde_json::Value;

use super::map::OverlayMap;
use super::record::OverlayType;
use crate::diff::apply_patch;
use crate::model::{BaseEntity, EntitySchema};

/// A transient entity derived from a base entity plus overlays
///
/// `base_id` is the only link back to the base; a variant never keeps the
/// base alive.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantEntity {
    /// Id of the base entity this variant was derived from
    pub base_id: String,

    /// Overlays applied, in application order
    pub overlay_ids: Vec<OverlayId>,

    /// Last applied overlay of each kind
    pub applied_overlays: BTreeMap<OverlayType, OverlayId>,

    /// Combined document source (never contains the overlay map)
    pub source: Value,
}

impl VariantEntity {
    /// Display name of the combined document
    pub fn name(&self) -> &str {
        self.source
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// The override overlay this variant saves into, if any
    pub fn override_id(&self) -> Option<&OverlayId> {
        self.applied_overlays.get(&OverlayType::Override)
    }

    /// Stable key identifying this variant's sheet
    pub fn sheet_key(&self) -> String {
        let ids: Vec<&str> = self.overlay_ids.iter().map(OverlayId::as_str).collect();
        format!("{}:{}", self.base_id, ids.join("+"))
    }
}

/// Apply `overlay_ids` in order onto a deep copy of `base`.
///
/// Later overlays win on conflicting fields. Returns `None` when any id is
/// missing from `overlays` or the combined document fails `schema`.
pub fn materialize(
    base: &BaseEntity,
    overlays: &OverlayMap,
    overlays_path: &str,
    overlay_ids: &[OverlayId],
    schema: &dyn EntitySchema,
) -> Option<VariantEntity> {
    let mut source = base.resolved_source(overlays_path);
    let mut applied_overlays = BTreeMap::new();

    for id in overlay_ids {
        let Some(record) = overlays.get(id) else {
            tracing::debug!(entity_id = %base.id, overlay_id = %id, "overlay missing");
            return None;
        };
        source = apply_patch(&source, &record.body);
        applied_overlays.insert(record.overlay_type.clone(), id.clone());
    }

    if let Err(reason) = schema.validate(&source) {
        tracing::debug!(entity_id = %base.id, reason = %reason, "variant rejected by schema");
        return None;
    }

    Some(VariantEntity {
        base_id: base.id.clone(),
        overlay_ids: overlay_ids.to_vec(),
        applied_overlays,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnySchema, SpellSchema};
    use serde_json::json;

    fn spell() -> BaseEntity {
        BaseEntity::from_source(json!({
            "_id": "spell1",
            "name": "Fireball",
            "type": "spell",
            "data": {
                "level": {"value": 3},
                "damage": {"value": "6d6"},
                "overlays": {
                    "o1": {"_id": "o1", "sort": 1, "overlayType": "override",
                           "name": "Fireball (5th)", "data": {"level": {"value": 5}}},
                    "o2": {"_id": "o2", "sort": 2, "overlayType": "override",
                           "data": {"level": {"value": 7}, "damage": {"value": "10d6"}}},
                    "bad": {"_id": "bad", "sort": 3, "overlayType": "override",
                            "data": {"level": {"value": 42}}}
                }
            }
        }))
        .unwrap()
    }

    fn overlays(base: &BaseEntity) -> OverlayMap {
        OverlayMap::from_stored(base.overlay_source("data.overlays"))
    }

    #[test]
    fn test_single_override_applies_fields() {
        let base = spell();
        let map = overlays(&base);
        let variant =
            materialize(&base, &map, "data.overlays", &[OverlayId::from("o1")], &SpellSchema)
                .unwrap();

        assert_eq!(variant.name(), "Fireball (5th)");
        assert_eq!(variant.source["data"]["level"]["value"], 5);
        assert_eq!(variant.source["data"]["damage"]["value"], "6d6");
        assert!(variant.source["data"].get("overlays").is_none());
        assert_eq!(variant.override_id(), Some(&OverlayId::from("o1")));
        assert_eq!(variant.base_id, "spell1");
    }

    #[test]
    fn test_later_overlays_win() {
        let base = spell();
        let map = overlays(&base);
        let ids = [OverlayId::from("o1"), OverlayId::from("o2")];
        let variant = materialize(&base, &map, "data.overlays", &ids, &SpellSchema).unwrap();

        assert_eq!(variant.source["data"]["level"]["value"], 7);
        assert_eq!(variant.name(), "Fireball (5th)");
        assert_eq!(variant.override_id(), Some(&OverlayId::from("o2")));
    }

    #[test]
    fn test_missing_id_yields_none() {
        let base = spell();
        let map = overlays(&base);
        let ids = [OverlayId::from("o1"), OverlayId::from("missing")];
        assert!(materialize(&base, &map, "data.overlays", &ids, &AnySchema).is_none());
    }

    #[test]
    fn test_schema_failure_yields_none() {
        let base = spell();
        let map = overlays(&base);
        let ids = [OverlayId::from("bad")];
        assert!(materialize(&base, &map, "data.overlays", &ids, &SpellSchema).is_none());
        assert!(materialize(&base, &map, "data.overlays", &ids, &AnySchema).is_some());
    }

    #[test]
    fn test_base_is_not_mutated() {
        let base = spell();
        let before = base.clone();
        let map = overlays(&base);
        materialize(&base, &map, "data.overlays", &[OverlayId::from("o2")], &SpellSchema);
        assert_eq!(base, before);
    }
}
