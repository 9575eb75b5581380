//! Identifier newtypes
//!
//! Overlay ids are opaque strings keyed into a base entity's overlay map.
//! Cycle ids tag one rule-element preparation pass for log correlation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of an overlay record within its base entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayId(String);

impl OverlayId {
    /// Generate a fresh id using UUIDv7 in its dash-free form
    ///
    /// Dashes are omitted so the id is a single dotted-path segment.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OverlayId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for OverlayId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier for a single preparation cycle
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleId(String);

impl CycleId {
    /// Generate a new random CycleId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CycleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_id_generation() {
        let id1 = OverlayId::generate();
        let id2 = OverlayId::generate();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
        assert!(!id1.as_str().contains('-'));
        assert!(!id1.as_str().contains('.'));
    }

    #[test]
    fn test_overlay_id_display() {
        let id = OverlayId::from("abc123");
        assert_eq!(format!("{}", id), "abc123");
    }

    #[test]
    fn test_overlay_id_serializes_as_plain_string() {
        let id = OverlayId::from("ovl1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ovl1\"");
        let back: OverlayId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_cycle_id_generation() {
        let id1 = CycleId::new();
        let id2 = CycleId::new();
        assert_ne!(id1, id2);
    }
}
