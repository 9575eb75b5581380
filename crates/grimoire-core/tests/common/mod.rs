use std::sync::Arc;

use grimoire_core::model::{Actor, BaseEntity, Item, SpellSchema};
use grimoire_core::overlay::{OverlayStore, StoreContext};
use grimoire_core::ports::{MemoryPersistence, RecordingPresenter};
use serde_json::{json, Value};

/// Persisted source of a level 3 Fireball with no overlays
#[allow(dead_code)]
pub fn fireball_source() -> Value {
    json!({
        "_id": "fireball",
        "name": "Fireball",
        "type": "spell",
        "data": {
            "level": {"value": 3},
            "damage": {"value": "6d6", "type": "fire"},
            "traits": {"value": ["evocation", "fire"]},
            "overlays": {}
        }
    })
}

/// Collaborators and a store over [`fireball_source`]
#[allow(dead_code)]
pub struct StoreFixture {
    pub persistence: Arc<MemoryPersistence>,
    pub presenter: Arc<RecordingPresenter>,
    pub store: OverlayStore,
}

/// Build a store whose persistence already holds `source`
#[allow(dead_code)]
pub fn store_with(source: Value) -> StoreFixture {
    let persistence = Arc::new(MemoryPersistence::with_document(source.clone()));
    let presenter = Arc::new(RecordingPresenter::new());
    let ctx = StoreContext::new(persistence.clone())
        .with_presenter(presenter.clone())
        .with_schema(Arc::new(SpellSchema));
    let store = OverlayStore::load(BaseEntity::from_source(source).unwrap(), ctx);
    StoreFixture {
        persistence,
        presenter,
        store,
    }
}

#[allow(dead_code)]
pub fn fireball_store() -> StoreFixture {
    store_with(fireball_source())
}

/// Turn a JSON object literal into a patch
#[allow(dead_code)]
pub fn patch(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().unwrap()
}

/// An actor holding one torch item with the given rule sources
#[allow(dead_code)]
pub fn actor_with_rules(rules: Vec<Value>) -> Actor {
    let mut actor: Actor = serde_json::from_value(json!({
        "_id": "ezren",
        "name": "Ezren",
        "data": {"attributes": {"light": {"bright": 20, "dim": 40}}},
        "rollOptions": ["self:torch-lit"]
    }))
    .unwrap();
    let mut item = Item::new("torch", "Torch", None);
    item.rules = rules;
    actor.add_item(item);
    actor
}
