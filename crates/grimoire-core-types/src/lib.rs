//! Core types shared across Grimoire facilities
//!
//! This crate provides foundational types used by the overlay store, the
//! rule-element pipeline and the logging facility:
//!
//! - **Identifiers**: OverlayId, CycleId
//! - **Schema constants**: Canonical field keys and event names

pub mod ids;
pub mod schema;

pub use ids::{CycleId, OverlayId};
