use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::source::RuleElementSource;
use crate::errors::{GrimoireError, Result};
use crate::model::Synthetics;
use crate::ports::{ResolveContext, ValueResolver};

/// Lifecycle state of a rule element within one preparation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleElementState {
    Constructed,
    Validating,
    Active,
    Suppressed,
}

/// Everything a constructor may read while building an instance
#[derive(Clone, Copy)]
pub struct ElementContext<'a> {
    pub item_id: &'a str,
    /// Owner of the item; `None` for an unowned item
    pub actor_id: Option<&'a str>,
    pub actor_data: &'a Value,
    pub resolver: &'a dyn ValueResolver,
}

impl<'a> ElementContext<'a> {
    /// Resolve a raw value in the context of the owning actor and item
    pub fn resolve(&self, raw: &Value) -> Value {
        self.resolver.resolve_value(
            raw,
            ResolveContext {
                actor_data: self.actor_data,
                item_id: self.item_id,
            },
        )
    }
}

/// State shared by every rule element kind
///
/// Holds a private copy of the source; nothing an instance does reaches the
/// item's persisted rules.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleElementBase {
    pub source: RuleElementSource,
    pub item_id: String,
    pub actor_id: String,
    state: RuleElementState,
    failure: Option<String>,
}

impl RuleElementBase {
    /// # Errors
    ///
    /// Returns `ConstructionFailure` when the item has no owning actor.
    pub fn new(source: RuleElementSource, ctx: &ElementContext<'_>) -> Result<Self> {
        let actor_id = ctx
            .actor_id
            .ok_or_else(|| GrimoireError::ConstructionFailure {
                kind: source.kind.clone(),
                item_id: ctx.item_id.to_string(),
                reason: "item is not owned by an actor".to_string(),
            })?
            .to_string();

        Ok(Self {
            source,
            item_id: ctx.item_id.to_string(),
            actor_id,
            state: RuleElementState::Constructed,
            failure: None,
        })
    }

    pub fn state(&self) -> RuleElementState {
        self.state
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn begin_validation(&mut self) {
        self.state = RuleElementState::Validating;
    }

    /// Suppress the element for the rest of the cycle
    pub fn fail_validation(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(
            kind = %self.source.kind,
            item_id = %self.item_id,
            message = %message,
            "rule element suppressed"
        );
        self.state = RuleElementState::Suppressed;
        self.failure = Some(message);
    }

    /// Finish validation; a suppressed element stays suppressed
    pub fn activate(&mut self) {
        if self.state != RuleElementState::Suppressed {
            self.state = RuleElementState::Active;
        }
    }

    /// Test the predicate against the actor's current roll options
    pub fn test(&self, roll_options: &BTreeSet<String>) -> bool {
        self.source
            .predicate
            .as_ref()
            .map_or(true, |p| p.test(roll_options))
    }
}

/// A constructed rule element instance
///
/// Implementations validate in their constructor and contribute effects in
/// [`RuleElement::after_prepare_data`].
pub trait RuleElement {
    fn base(&self) -> &RuleElementBase;

    /// Check and normalize the payload; failures suppress the element
    fn validate_data(&mut self, ctx: &ElementContext<'_>);

    /// Write this element's effect into the cycle's synthetics
    ///
    /// Returns whether an effect was written.
    fn after_prepare_data(&self, roll_options: &BTreeSet<String>, synthetics: &mut Synthetics) -> bool;

    fn kind(&self) -> &str {
        &self.base().source.kind
    }

    fn state(&self) -> RuleElementState {
        self.base().state()
    }

    fn failure(&self) -> Option<&str> {
        self.base().failure()
    }

    fn is_active(&self) -> bool {
        self.state() == RuleElementState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::resolve::PassthroughResolver;
    use serde_json::json;

    fn source() -> RuleElementSource {
        RuleElementSource::from_value(&json!({"type": "TokenLight", "predicate": ["lit"]})).unwrap()
    }

    #[test]
    fn test_unowned_item_cannot_construct() {
        let data = json!({});
        let ctx = ElementContext {
            item_id: "i1",
            actor_id: None,
            actor_data: &data,
            resolver: &PassthroughResolver,
        };
        let err = RuleElementBase::new(source(), &ctx).unwrap_err();
        assert!(matches!(err, GrimoireError::ConstructionFailure { .. }));
    }

    #[test]
    fn test_suppression_sticks() {
        let data = json!({});
        let ctx = ElementContext {
            item_id: "i1",
            actor_id: Some("a1"),
            actor_data: &data,
            resolver: &PassthroughResolver,
        };
        let mut base = RuleElementBase::new(source(), &ctx).unwrap();
        assert_eq!(base.state(), RuleElementState::Constructed);
        base.begin_validation();
        base.fail_validation("bad");
        base.activate();
        assert_eq!(base.state(), RuleElementState::Suppressed);
        assert_eq!(base.failure(), Some("bad"));
    }

    #[test]
    fn test_predicate_uses_roll_options() {
        let data = json!({});
        let ctx = ElementContext {
            item_id: "i1",
            actor_id: Some("a1"),
            actor_data: &data,
            resolver: &PassthroughResolver,
        };
        let base = RuleElementBase::new(source(), &ctx).unwrap();
        let mut options = BTreeSet::new();
        assert!(!base.test(&options));
        options.insert("lit".to_string());
        assert!(base.test(&options));
    }
}
