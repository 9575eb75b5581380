//! Rule elements: data-driven mutations applied during actor preparation.
//!
//! Items carry raw rule sources. Every preparation cycle the
//! [`pipeline::RulePipeline`] turns them into [`element::RuleElement`]
//! instances through the [`registry::RuleElementRegistry`], evaluates them
//! in priority order and collects their effects into the actor's synthetics.

pub mod element;
pub mod light;
pub mod pipeline;
pub mod predicate;
pub mod registry;
pub mod resolve;
pub mod source;
pub mod token_light;

pub use element::{ElementContext, RuleElement, RuleElementBase, RuleElementState};
pub use light::{LightAnimation, LightSource};
pub use pipeline::{ElementOutcome, ElementReport, PreparationReport, RulePipeline};
pub use predicate::{Predicate, PredicateTerm};
pub use registry::{RuleElementConstructor, RuleElementRegistry};
pub use resolve::{ActorPathResolver, PassthroughResolver};
pub use source::RuleElementSource;
pub use token_light::TokenLightRuleElement;
