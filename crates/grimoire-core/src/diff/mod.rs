//! Document diff engine.
//!
//! Computes the minimal structural difference between two JSON documents
//! and applies such differences back onto a document.
//!
//! ## Entry points
//!
//! ```
//! use grimoire_core::diff::{apply_patch, diff};
//! use serde_json::json;
//!
//! let origin = json!({"name": "Fireball", "data": {"level": 3, "range": "500 feet"}});
//! let variant = json!({"name": "Fireball", "data": {"level": 5, "range": "500 feet"}});
//!
//! let patch = diff(&origin, &variant);
//! assert_eq!(serde_json::Value::Object(patch.clone()), json!({"data": {"level": 5}}));
//! assert_eq!(apply_patch(&origin, &patch), variant);
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: maps are sorted, so identical inputs produce identical patches.
//! - **Round trip**: `apply_patch(a, &diff(a, b)) == b`.
//! - **Arrays are atomic**: a changed array is replaced whole.
//! - **Removals** are encoded as `"-=<key>": null` deletion markers.
//! - **Escaping**: a document key starting with `-=` or `\` is written with
//!   one extra leading `\`, so it never reads as a marker.

pub mod engine;
pub mod path;

pub use engine::{
    apply_patch, diff, escape_key, is_deletion_key, Patch, DELETION_PREFIX, ESCAPE_PREFIX,
};
pub use path::{apply_pathed_update, PathedUpdate};
