use std::collections::HashMap;

use grimoire_core_types::OverlayId;
use serde_json::{Map, Value};

use super::record::{OverlayRecord, OverlayType};

/// Insertion-ordered index of a base entity's overlay records
///
/// Loaded in `(sort, id)` order; later insertions append. Replacing a
/// record through [`OverlayMap::insert_at`] keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayMap {
    order: Vec<OverlayId>,
    records: HashMap<OverlayId, OverlayRecord>,
}

impl OverlayMap {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from the persisted `{ [id]: record }` map
    ///
    /// Malformed records are left out of the index; the rest still load.
    pub fn from_stored(stored: Option<&Map<String, Value>>) -> Self {
        let mut records: Vec<OverlayRecord> = stored
            .into_iter()
            .flatten()
            .filter_map(|(key, value)| match OverlayRecord::from_stored(key, value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(overlay_id = %key, error = %e, "skipping overlay record");
                    None
                }
            })
            .collect();
        records.sort_by(|a, b| a.sort.cmp(&b.sort).then_with(|| a.id.cmp(&b.id)));

        let mut map = Self::new();
        for record in records {
            map.insert(record);
        }
        map
    }

    /// Get a record by id
    pub fn get(&self, id: &OverlayId) -> Option<&OverlayRecord> {
        self.records.get(id)
    }

    /// Check whether a record exists
    pub fn contains(&self, id: &OverlayId) -> bool {
        self.records.contains_key(id)
    }

    /// Insert a record, appending it unless its id is already present
    pub fn insert(&mut self, record: OverlayRecord) {
        if !self.records.contains_key(&record.id) {
            self.order.push(record.id.clone());
        }
        self.records.insert(record.id.clone(), record);
    }

    /// Insert a record at `position` (clamped to the end)
    pub fn insert_at(&mut self, position: usize, record: OverlayRecord) {
        if self.records.contains_key(&record.id) {
            self.insert(record);
            return;
        }
        let position = position.min(self.order.len());
        self.order.insert(position, record.id.clone());
        self.records.insert(record.id.clone(), record);
    }

    /// Remove a record, returning it with its former position
    pub fn remove(&mut self, id: &OverlayId) -> Option<(usize, OverlayRecord)> {
        let record = self.records.remove(id)?;
        let position = self.order.iter().position(|o| o == id)?;
        self.order.remove(position);
        Some((position, record))
    }

    /// Records in index order
    pub fn iter(&self) -> impl Iterator<Item = &OverlayRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Ids in index order
    pub fn ids(&self) -> &[OverlayId] {
        &self.order
    }

    /// Number of records of the given kind
    pub fn count_of(&self, overlay_type: &OverlayType) -> usize {
        self.records
            .values()
            .filter(|r| &r.overlay_type == overlay_type)
            .count()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Patch;
    use serde_json::json;

    fn record(id: &str, sort: u32) -> OverlayRecord {
        OverlayRecord::new(OverlayId::from(id), sort, OverlayType::Override, Patch::new())
    }

    #[test]
    fn test_from_stored_orders_by_sort_then_id() {
        let stored = json!({
            "zzz": {"_id": "zzz", "sort": 1, "overlayType": "override"},
            "aaa": {"_id": "aaa", "sort": 3, "overlayType": "override"},
            "mmm": {"_id": "mmm", "sort": 1, "overlayType": "override"}
        });
        let map = OverlayMap::from_stored(stored.as_object());
        let ids: Vec<&str> = map.ids().iter().map(OverlayId::as_str).collect();
        assert_eq!(ids, vec!["mmm", "zzz", "aaa"]);
    }

    #[test]
    fn test_from_stored_none_is_empty() {
        let map = OverlayMap::from_stored(None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_remove_and_reinsert_keeps_position() {
        let mut map = OverlayMap::new();
        map.insert(record("a", 1));
        map.insert(record("b", 2));
        map.insert(record("c", 3));

        let (position, removed) = map.remove(&OverlayId::from("b")).unwrap();
        assert_eq!(position, 1);
        map.insert_at(position, removed);

        let ids: Vec<&str> = map.ids().iter().map(OverlayId::as_str).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_insert_existing_id_replaces_in_place() {
        let mut map = OverlayMap::new();
        map.insert(record("a", 1));
        map.insert(record("b", 2));
        map.insert(record("a", 7));

        assert_eq!(map.len(), 2);
        assert_eq!(map.ids()[0].as_str(), "a");
        assert_eq!(map.get(&OverlayId::from("a")).unwrap().sort, 7);
    }

    #[test]
    fn test_count_of_override() {
        let mut map = OverlayMap::new();
        map.insert(record("a", 1));
        map.insert(record("b", 2));
        assert_eq!(map.count_of(&OverlayType::Override), 2);
    }

    #[test]
    fn test_from_stored_keeps_other_kinds_and_skips_malformed() {
        let stored = json!({
            "ok": {"_id": "ok", "sort": 1, "overlayType": "override"},
            "h": {"_id": "h", "sort": 1, "overlayType": "heightening"},
            "bad": {"_id": "elsewhere", "sort": 1, "overlayType": "override"},
            "junk": 7
        });
        let map = OverlayMap::from_stored(stored.as_object());
        let ids: Vec<&str> = map.ids().iter().map(OverlayId::as_str).collect();
        assert_eq!(ids, vec!["h", "ok"]);
        assert_eq!(map.count_of(&OverlayType::Override), 1);
        assert_eq!(
            map.get(&OverlayId::from("h")).unwrap().overlay_type,
            OverlayType::Other("heightening".to_string())
        );
    }
}
