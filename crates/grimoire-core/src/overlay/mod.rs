//! Overlays: named, ordered, persisted patches on a base entity.
//!
//! - [`record`]: the on-disk record shape and overlay kinds
//! - [`map`]: the ordered in-memory index of a base entity's records
//! - [`materializer`]: derives variant entities from base + records
//! - [`store`]: the public collection API, persisting edits as diffs

pub mod map;
pub mod materializer;
pub mod record;
pub mod store;

pub use map::OverlayMap;
pub use materializer::{materialize, VariantEntity};
pub use record::{OverlayRecord, OverlayType};
pub use store::{CreateOptions, OverlayStore, StoreContext};
