use thiserror::Error;

/// Result type alias using GrimoireError
pub type Result<T> = std::result::Result<T, GrimoireError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and log assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Lookup
    NotFound,

    // Overlay
    UnsupportedOverlayKind,
    InvalidOverlayRecord,
    InvalidInput,
    InvalidPath,

    // Rule elements
    ValidationFailure,
    ConstructionFailure,

    // Integration/IO
    Persistence,
    Serialization,
    InvalidConfig,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::UnsupportedOverlayKind => "ERR_UNSUPPORTED_OVERLAY_KIND",
            ExErrorKind::InvalidOverlayRecord => "ERR_INVALID_OVERLAY_RECORD",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidPath => "ERR_INVALID_PATH",
            ExErrorKind::ValidationFailure => "ERR_VALIDATION_FAILURE",
            ExErrorKind::ConstructionFailure => "ERR_CONSTRUCTION_FAILURE",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Classification plus context for logging and diagnostics. Domain code
/// raises [`GrimoireError`]; boundaries convert into this shape.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    overlay_id: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            overlay_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add overlay ID context
    pub fn with_overlay_id(mut self, id: impl Into<String>) -> Self {
        self.overlay_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the overlay ID context, if any
    pub fn overlay_id(&self) -> Option<&str> {
        self.overlay_id.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(overlay_id) = &self.overlay_id {
            write!(f, " (overlay_id: {})", overlay_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for overlay and rule-element operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GrimoireError {
    /// The base entity has no overlay with this id
    #[error("Entity {entity_id} does not have an overlay with id: {overlay_id}")]
    OverlayNotFound {
        entity_id: String,
        overlay_id: String,
    },

    /// The requested overlay kind is not supported by this store
    #[error("Unsupported overlay kind: {kind}")]
    UnsupportedOverlayKind { kind: String },

    /// A persisted overlay record is malformed
    #[error("Invalid overlay record {overlay_id}: {reason}")]
    InvalidOverlayRecord { overlay_id: String, reason: String },

    /// A variant passed to an override update carries no override overlay
    #[error("Variant of {entity_id} has no override overlay applied")]
    VariantWithoutOverride { entity_id: String },

    /// A rule element payload failed validation
    #[error("Rule element {kind} on item {item_id} failed validation: {message}")]
    ValidationFailure {
        kind: String,
        item_id: String,
        message: String,
    },

    /// A rule element could not be constructed (missing owning context)
    #[error("Rule element {kind} on item {item_id} cannot be constructed: {reason}")]
    ConstructionFailure {
        kind: String,
        item_id: String,
        reason: String,
    },

    /// The persistence collaborator failed
    #[error("Persistence failure for {document_id}: {message}")]
    Persistence {
        document_id: String,
        message: String,
    },

    /// A dotted update path cannot be applied to the document
    #[error("Invalid document path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Configuration could not be loaded
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// JSON (de)serialization failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<serde_json::Error> for GrimoireError {
    fn from(err: serde_json::Error) -> Self {
        GrimoireError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<GrimoireError> for ExError {
    fn from(err: GrimoireError) -> Self {
        let message = err.to_string();
        match err {
            GrimoireError::OverlayNotFound {
                entity_id,
                overlay_id,
            } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(entity_id)
                .with_overlay_id(overlay_id)
                .with_message(message),
            GrimoireError::UnsupportedOverlayKind { .. } => {
                ExError::new(ExErrorKind::UnsupportedOverlayKind).with_message(message)
            }
            GrimoireError::InvalidOverlayRecord { overlay_id, .. } => {
                ExError::new(ExErrorKind::InvalidOverlayRecord)
                    .with_overlay_id(overlay_id)
                    .with_message(message)
            }
            GrimoireError::VariantWithoutOverride { entity_id } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_entity_id(entity_id)
                    .with_message(message)
            }
            GrimoireError::ValidationFailure { item_id, .. } => {
                ExError::new(ExErrorKind::ValidationFailure)
                    .with_entity_id(item_id)
                    .with_message(message)
            }
            GrimoireError::ConstructionFailure { item_id, .. } => {
                ExError::new(ExErrorKind::ConstructionFailure)
                    .with_entity_id(item_id)
                    .with_message(message)
            }
            GrimoireError::Persistence { document_id, .. } => {
                ExError::new(ExErrorKind::Persistence)
                    .with_entity_id(document_id)
                    .with_message(message)
            }
            GrimoireError::InvalidPath { .. } => {
                ExError::new(ExErrorKind::InvalidPath).with_message(message)
            }
            GrimoireError::InvalidConfig { .. } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(message)
            }
            GrimoireError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_not_found_kind() {
        let err = GrimoireError::OverlayNotFound {
            entity_id: "spell1".to_string(),
            overlay_id: "missing".to_string(),
        };
        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::NotFound);
        assert_eq!(ex.code(), "ERR_NOT_FOUND");
        assert_eq!(ex.overlay_id(), Some("missing"));
        assert_eq!(ex.entity_id(), Some("spell1"));
    }

    #[test]
    fn test_display_includes_code_op_and_message() {
        let ex = ExError::new(ExErrorKind::Persistence)
            .with_op("delete_overlay")
            .with_message("disk full");
        let rendered = ex.to_string();
        assert!(rendered.starts_with("[ERR_PERSISTENCE]"));
        assert!(rendered.contains("delete_overlay"));
        assert!(rendered.contains("disk full"));
    }

    #[test]
    fn test_serde_json_error_converts_to_serialization() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: GrimoireError = parse_err.into();
        assert!(matches!(err, GrimoireError::Serialization { .. }));
    }
}
