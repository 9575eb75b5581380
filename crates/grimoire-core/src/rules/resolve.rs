//! Reference [`ValueResolver`] implementations.

use serde_json::Value;

use crate::diff::path::get_path;
use crate::ports::{ResolveContext, ValueResolver};

const ACTOR_PREFIX: &str = "@actor.";

/// Resolver that only turns numeric strings into numbers
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughResolver;

impl ValueResolver for PassthroughResolver {
    fn resolve_value(&self, raw: &Value, _ctx: ResolveContext<'_>) -> Value {
        parse_numeric(raw).unwrap_or_else(|| raw.clone())
    }
}

/// Resolver for `"@actor.<dotted path>"` references into the actor's data
///
/// A reference that is missing or points at a non-number is returned
/// unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActorPathResolver;

impl ValueResolver for ActorPathResolver {
    fn resolve_value(&self, raw: &Value, ctx: ResolveContext<'_>) -> Value {
        if let Some(path) = raw.as_str().and_then(|s| s.strip_prefix(ACTOR_PREFIX)) {
            return match get_path(ctx.actor_data, path) {
                Some(found) if found.is_number() => found.clone(),
                _ => {
                    tracing::debug!(item_id = ctx.item_id, reference = %raw, "reference did not resolve");
                    raw.clone()
                }
            };
        }
        parse_numeric(raw).unwrap_or_else(|| raw.clone())
    }
}

fn parse_numeric(raw: &Value) -> Option<Value> {
    let text = raw.as_str()?.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::from(n));
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Value::from)
}
