use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rules::light::LightSource;

/// Item - a persisted document owned by an actor that may carry rule elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item id (`_id`)
    #[serde(rename = "_id")]
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Owning actor id; `None` for an item that is not embedded in an actor
    #[serde(default, rename = "actorId", skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,

    /// Raw persisted rule-element sources, in declaration order
    #[serde(default)]
    pub rules: Vec<Value>,
}

impl Item {
    /// Create an item owned by `actor_id` with no rules
    pub fn new(id: impl Into<String>, name: impl Into<String>, actor_id: Option<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            actor_id,
            rules: Vec::new(),
        }
    }
}

/// Derived token overrides for one preparation cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenOverrides {
    /// Light emitted by the actor's token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<LightSource>,
}

/// Transient derived state accumulated during one preparation cycle
///
/// Reset at the start of every cycle; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Synthetics {
    #[serde(rename = "tokenOverrides")]
    pub token_overrides: TokenOverrides,
}

/// Actor - the owner of items whose rule elements are prepared each cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Actor id (`_id`)
    #[serde(rename = "_id")]
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Actor data used for value resolution (`@actor.<path>`)
    #[serde(default)]
    pub data: Value,

    /// Roll options predicates are tested against
    #[serde(default, rename = "rollOptions")]
    pub roll_options: BTreeSet<String>,

    /// Owned items
    #[serde(default)]
    pub items: Vec<Item>,

    /// Derived state of the most recent preparation cycle
    #[serde(skip)]
    pub synthetics: Synthetics,
}

impl Actor {
    /// Create an actor with no data, options or items
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data: Value::Object(serde_json::Map::new()),
            roll_options: BTreeSet::new(),
            items: Vec::new(),
            synthetics: Synthetics::default(),
        }
    }

    /// Embed an item, setting its owner to this actor
    pub fn add_item(&mut self, mut item: Item) {
        item.actor_id = Some(self.id.clone());
        self.items.push(item);
    }

    /// Find an owned item by id
    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_item_sets_owner() {
        let mut actor = Actor::new("a1", "Ezren");
        actor.add_item(Item::new("i1", "Torch", None));
        assert_eq!(actor.items[0].actor_id.as_deref(), Some("a1"));
    }

    #[test]
    fn test_actor_deserializes_without_synthetics() {
        let actor: Actor = serde_json::from_value(json!({
            "_id": "a1",
            "name": "Ezren",
            "rollOptions": ["self:lit"],
            "items": [{"_id": "i1", "name": "Torch", "actorId": "a1", "rules": []}]
        }))
        .unwrap();
        assert!(actor.roll_options.contains("self:lit"));
        assert_eq!(actor.synthetics, Synthetics::default());
        assert_eq!(actor.items.len(), 1);
    }
}
