//! Rule element preparation pipeline.
//!
//! One call to [`RulePipeline::prepare`] is one preparation cycle:
//!
//! 1. The actor's synthetics are reset.
//! 2. Every rule source on every item is parsed from a deep copy and
//!    instantiated through the registry; instances never outlive the cycle.
//! 3. Instances run `after_prepare_data` in ascending priority, ties in
//!    declaration order.
//!
//! Every source gets an [`ElementOutcome`] in the returned report.

use std::time::Instant;

use grimoire_core_types::CycleId;
use serde::{Deserialize, Serialize};

use super::element::{ElementContext, RuleElement, RuleElementState};
use super::registry::RuleElementRegistry;
use super::source::RuleElementSource;
use crate::config::{RulesConfig, DEFAULT_RULE_PRIORITY};
use crate::errors::Result;
use crate::model::{Actor, Synthetics};
use crate::ports::ValueResolver;
use crate::{log_op_end, log_op_error, log_op_start};

/// What happened to one rule source during a cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ElementOutcome {
    /// Valid and its predicate held; the effect was applied
    Active,
    /// Valid but its predicate did not hold
    Inactive,
    /// Payload failed validation
    Suppressed { message: String },
    /// No constructor is registered for the kind
    Unregistered,
    /// The kind is disabled by configuration
    Disabled,
    /// The source is flagged `ignored`
    Ignored,
    /// The source could not be parsed
    Malformed { message: String },
}

/// Report entry for one rule source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementReport {
    pub item_id: String,
    /// Position within the item's rules
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub priority: i32,
    #[serde(flatten)]
    pub outcome: ElementOutcome,
}

/// Result of one preparation cycle
///
/// `synthetics` is a copy; later cycles never change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparationReport {
    pub cycle_id: CycleId,
    pub synthetics: Synthetics,
    /// One entry per rule source, in declaration order
    pub elements: Vec<ElementReport>,
}

impl PreparationReport {
    /// Number of entries whose outcome matches `predicate`
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&ElementOutcome) -> bool,
    {
        self.elements.iter().filter(|e| predicate(&e.outcome)).count()
    }
}

/// An instance waiting for evaluation
struct Pending {
    report: usize,
    priority: i32,
    element: Box<dyn RuleElement>,
}

/// Runs preparation cycles against a registry
#[derive(Debug, Clone)]
pub struct RulePipeline {
    registry: RuleElementRegistry,
    default_priority: i32,
}

impl Default for RulePipeline {
    fn default() -> Self {
        Self::new(RuleElementRegistry::with_builtins())
    }
}

impl RulePipeline {
    pub fn new(registry: RuleElementRegistry) -> Self {
        Self {
            registry,
            default_priority: DEFAULT_RULE_PRIORITY,
        }
    }

    /// Pipeline over the built-ins, honoring disabled kinds and priority
    pub fn from_config(config: &RulesConfig) -> Self {
        Self::new(RuleElementRegistry::from_config(config))
            .with_default_priority(config.default_priority)
    }

    pub fn with_default_priority(mut self, priority: i32) -> Self {
        self.default_priority = priority;
        self
    }

    pub fn registry(&self) -> &RuleElementRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RuleElementRegistry {
        &mut self.registry
    }

    /// Run one preparation cycle for `actor`
    ///
    /// # Errors
    ///
    /// Returns `ConstructionFailure` if a rule sits on an item whose
    /// `actorId` names a different actor. Items without an `actorId` are
    /// owned by `actor`. The actor's synthetics are left reset on failure.
    pub fn prepare(
        &self,
        actor: &mut Actor,
        resolver: &dyn ValueResolver,
    ) -> Result<PreparationReport> {
        let cycle_id = CycleId::new();
        log_op_start!("rules_prepare", cycle_id = %cycle_id, actor_id = %actor.id);
        let start = Instant::now();

        actor.synthetics = Synthetics::default();

        let (mut elements, mut pending) = match self.instantiate(actor, resolver) {
            Ok(built) => built,
            Err(e) => {
                log_op_error!(
                    "rules_prepare",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    cycle_id = %cycle_id
                );
                return Err(e);
            }
        };

        pending.sort_by_key(|p| (p.priority, p.report));
        for entry in &pending {
            let outcome = match entry.element.state() {
                RuleElementState::Suppressed => ElementOutcome::Suppressed {
                    message: entry.element.failure().unwrap_or_default().to_string(),
                },
                _ => {
                    if entry
                        .element
                        .after_prepare_data(&actor.roll_options, &mut actor.synthetics)
                    {
                        ElementOutcome::Active
                    } else {
                        ElementOutcome::Inactive
                    }
                }
            };
            elements[entry.report].outcome = outcome;
        }

        let report = PreparationReport {
            cycle_id,
            synthetics: actor.synthetics.clone(),
            elements,
        };

        log_op_end!(
            "rules_prepare",
            duration_ms = start.elapsed().as_millis() as u64,
            cycle_id = %report.cycle_id,
            element_count = report.elements.len()
        );
        Ok(report)
    }

    fn instantiate(
        &self,
        actor: &Actor,
        resolver: &dyn ValueResolver,
    ) -> Result<(Vec<ElementReport>, Vec<Pending>)> {
        let mut elements = Vec::new();
        let mut pending = Vec::new();

        for item in &actor.items {
            // embedded items belong to `actor` unless they name another owner
            let owner = match item.actor_id.as_deref() {
                None => Some(actor.id.as_str()),
                Some(id) if id == actor.id => Some(id),
                Some(_) => None,
            };
            let ctx = ElementContext {
                item_id: &item.id,
                actor_id: owner,
                actor_data: &actor.data,
                resolver,
            };

            for (index, raw) in item.rules.iter().enumerate() {
                let mut entry = ElementReport {
                    item_id: item.id.clone(),
                    index,
                    kind: None,
                    label: None,
                    priority: self.default_priority,
                    outcome: ElementOutcome::Inactive,
                };

                let source = match RuleElementSource::from_value(raw) {
                    Ok(source) => source,
                    Err(e) => {
                        tracing::debug!(item_id = %item.id, index, error = %e, "malformed rule source");
                        entry.outcome = ElementOutcome::Malformed {
                            message: e.to_string(),
                        };
                        elements.push(entry);
                        continue;
                    }
                };
                entry.kind = Some(source.kind.clone());
                entry.label = source.label.clone();
                entry.priority = source.priority_or(self.default_priority);

                if source.ignored {
                    entry.outcome = ElementOutcome::Ignored;
                } else if self.registry.is_disabled(&source.kind) {
                    entry.outcome = ElementOutcome::Disabled;
                } else {
                    let priority = entry.priority;
                    match self.registry.construct(source, &ctx)? {
                        Some(element) => pending.push(Pending {
                            report: elements.len(),
                            priority,
                            element,
                        }),
                        None => entry.outcome = ElementOutcome::Unregistered,
                    }
                }
                elements.push(entry);
            }
        }

        tracing::debug!(
            sources = elements.len(),
            instances = pending.len(),
            "rule elements instantiated"
        );
        Ok((elements, pending))
    }
}
