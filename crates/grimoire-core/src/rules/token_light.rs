use std::collections::BTreeSet;

use serde_json::Value;

use super::element::{ElementContext, RuleElement, RuleElementBase};
use super::light::LightSource;
use super::source::RuleElementSource;
use crate::errors::Result;
use crate::model::Synthetics;

/// Fields that may hold a reference resolved once during validation
const RESOLVED_FIELDS: [&str; 2] = ["dim", "bright"];

/// Adds or changes the light emitted by the actor's token
#[derive(Debug, Clone, PartialEq)]
pub struct TokenLightRuleElement {
    base: RuleElementBase,
    light: Option<LightSource>,
}

impl TokenLightRuleElement {
    pub const KIND: &'static str = "TokenLight";

    /// Build and validate an instance
    ///
    /// # Errors
    ///
    /// Returns `ConstructionFailure` when the item has no owning actor.
    /// Invalid payloads do not error; they suppress the instance.
    pub fn new(source: RuleElementSource, ctx: &ElementContext<'_>) -> Result<Self> {
        let mut element = Self {
            base: RuleElementBase::new(source, ctx)?,
            light: None,
        };
        element.validate_data(ctx);
        Ok(element)
    }

    /// Registry entry point
    ///
    /// # Errors
    ///
    /// See [`TokenLightRuleElement::new`].
    pub fn construct(
        source: RuleElementSource,
        ctx: &ElementContext<'_>,
    ) -> Result<Box<dyn RuleElement>> {
        Ok(Box::new(Self::new(source, ctx)?))
    }

    /// The validated light, once active
    pub fn light(&self) -> Option<&LightSource> {
        self.light.as_ref()
    }
}

impl RuleElement for TokenLightRuleElement {
    fn base(&self) -> &RuleElementBase {
        &self.base
    }

    fn validate_data(&mut self, ctx: &ElementContext<'_>) {
        self.base.begin_validation();

        let Some(light) = self.base.source.value.as_object_mut() else {
            self.base.fail_validation("light value must be an object");
            return;
        };
        for field in RESOLVED_FIELDS {
            if let Some(raw) = light.get(field) {
                let resolved = ctx.resolve(raw);
                if resolved.is_number() {
                    light.insert(field.to_string(), resolved);
                }
            }
        }

        let light = Value::Object(light.clone());
        match LightSource::from_value(&light) {
            Ok(light) => {
                self.light = Some(light);
                self.base.activate();
            }
            Err(message) => self.base.fail_validation(message),
        }
    }

    fn after_prepare_data(&self, roll_options: &BTreeSet<String>, synthetics: &mut Synthetics) -> bool {
        if !self.is_active() || !self.base.test(roll_options) {
            return false;
        }
        match &self.light {
            Some(light) => {
                synthetics.token_overrides.light = Some(light.clone());
                true
            }
            None => false,
        }
    }
}
