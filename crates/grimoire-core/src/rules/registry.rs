//! Rule element registry.
//!
//! Maps kind names to constructors. Kinds can be disabled by configuration;
//! the pipeline reports unknown and disabled kinds instead of dropping them.

use std::collections::{BTreeSet, HashMap};

use super::element::{ElementContext, RuleElement};
use super::source::RuleElementSource;
use super::token_light::TokenLightRuleElement;
use crate::config::RulesConfig;
use crate::errors::Result;

/// Builds a rule element instance from its parsed source
pub type RuleElementConstructor =
    fn(RuleElementSource, &ElementContext<'_>) -> Result<Box<dyn RuleElement>>;

#[derive(Clone, Default)]
pub struct RuleElementRegistry {
    constructors: HashMap<String, RuleElementConstructor>,
    disabled: BTreeSet<String>,
}

impl std::fmt::Debug for RuleElementRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleElementRegistry")
            .field("kinds", &self.kinds())
            .field("disabled", &self.disabled)
            .finish()
    }
}

impl RuleElementRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in kind
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(TokenLightRuleElement::KIND, TokenLightRuleElement::construct);
        registry
    }

    /// Built-ins minus the kinds configuration disables
    pub fn from_config(config: &RulesConfig) -> Self {
        let mut registry = Self::with_builtins();
        for kind in &config.disabled_kinds {
            registry.disable(kind);
        }
        registry
    }

    /// Register or replace the constructor for `kind`
    pub fn register(&mut self, kind: impl Into<String>, constructor: RuleElementConstructor) {
        self.constructors.insert(kind.into(), constructor);
    }

    pub fn disable(&mut self, kind: impl Into<String>) {
        self.disabled.insert(kind.into());
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    pub fn is_disabled(&self, kind: &str) -> bool {
        self.disabled.contains(kind)
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Construct an instance, or `None` if the kind is not registered
    ///
    /// # Errors
    ///
    /// Propagates the constructor's `ConstructionFailure`.
    pub fn construct(
        &self,
        source: RuleElementSource,
        ctx: &ElementContext<'_>,
    ) -> Result<Option<Box<dyn RuleElement>>> {
        match self.constructors.get(&source.kind) {
            Some(constructor) => constructor(source, ctx).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::resolve::PassthroughResolver;
    use serde_json::json;

    #[test]
    fn test_builtins_include_token_light() {
        let registry = RuleElementRegistry::with_builtins();
        assert_eq!(registry.kinds(), vec!["TokenLight"]);
    }

    #[test]
    fn test_config_disables_kinds() {
        let config = RulesConfig {
            disabled_kinds: vec!["TokenLight".to_string()],
            ..RulesConfig::default()
        };
        let registry = RuleElementRegistry::from_config(&config);
        assert!(registry.is_registered("TokenLight"));
        assert!(registry.is_disabled("TokenLight"));
    }

    #[test]
    fn test_unknown_kind_constructs_nothing() {
        let registry = RuleElementRegistry::with_builtins();
        let data = json!({});
        let ctx = ElementContext {
            item_id: "i1",
            actor_id: Some("a1"),
            actor_data: &data,
            resolver: &PassthroughResolver,
        };
        let source = RuleElementSource::from_value(&json!({"type": "FlatModifier"})).unwrap();
        assert!(registry.construct(source, &ctx).unwrap().is_none());
    }
}
