//! Core configuration loaded from TOML.
//!
//! ```toml
//! [logging]
//! profile = "production"
//!
//! [overlays]
//! path = "data.overlays"
//!
//! [rules]
//! disabled_kinds = ["TokenLight"]
//! default_priority = 100
//! ```
//!
//! Every section and key is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{GrimoireError, Result};
use crate::logging_facility::Profile;

/// Dotted path of the overlay map inside a base document
pub const DEFAULT_OVERLAYS_PATH: &str = "data.overlays";

/// Priority of rule sources that do not set one
pub const DEFAULT_RULE_PRIORITY: i32 = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub logging: LoggingConfig,
    pub overlays: OverlayConfig,
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub profile: Profile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    pub path: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_OVERLAYS_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    /// Kinds the registry refuses to instantiate
    pub disabled_kinds: Vec<String>,
    pub default_priority: i32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            disabled_kinds: Vec::new(),
            default_priority: DEFAULT_RULE_PRIORITY,
        }
    }
}

impl CoreConfig {
    /// Parse and validate configuration text
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for malformed TOML, unknown keys or an
    /// unusable overlay path.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: CoreConfig = toml::from_str(text).map_err(|e| GrimoireError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GrimoireError::InvalidConfig {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.overlays.path.split('.').any(str::is_empty) {
            return Err(GrimoireError::InvalidConfig {
                reason: format!("overlays.path {:?} has an empty segment", self.overlays.path),
            });
        }
        Ok(())
    }
}
