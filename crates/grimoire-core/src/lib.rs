//! Layered document extension engine.
//!
//! - [`overlay`]: named, ordered overlays on a base entity, persisted as diffs
//! - [`diff`]: structural document diffs and pathed updates
//! - [`rules`]: rule elements applied during actor preparation
//! - [`ports`]: persistence, presentation and value-resolution collaborators

#![allow(clippy::result_large_err)]

pub use grimoire_core_types as core_types;

pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod overlay;
pub mod ports;
pub mod rules;

pub use config::CoreConfig;
pub use errors::{ExError, ExErrorKind, GrimoireError, Result};
pub use overlay::{CreateOptions, OverlayStore, OverlayType, StoreContext, VariantEntity};
pub use rules::{PreparationReport, RuleElementRegistry, RulePipeline};
