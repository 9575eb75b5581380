//! Host light-source schema.
//!
//! [`LightSource`] is a partial light description: every field is optional
//! and unknown fields are rejected. Construction validates ranges the way
//! the host's own light data does, returning the first violation as text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Animation settings of a light
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LightAnimation {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// 0 to 10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// 1 to 10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,
}

/// Light emitted by a token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LightSource {
    /// Dim light radius, >= 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dim: Option<f64>,
    /// Bright light radius, >= 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bright: Option<f64>,
    /// Emission angle in degrees, 0 to 360
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    /// `#rrggbb`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Color intensity, 0 to 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    /// Coloration technique index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coloration: Option<u32>,
    /// -1 to 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub luminosity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<LightAnimation>,
}

impl LightSource {
    /// Construct and validate a light from raw data
    ///
    /// # Errors
    ///
    /// Returns a message describing the first shape or range violation.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let light: LightSource =
            serde_json::from_value(value.clone()).map_err(|e| format!("invalid light data: {}", e))?;
        light.validate()?;
        Ok(light)
    }

    /// Check every field against its allowed range
    ///
    /// # Errors
    ///
    /// Returns a message naming the first field out of range.
    pub fn validate(&self) -> Result<(), String> {
        check_min("dim", self.dim, 0.0)?;
        check_min("bright", self.bright, 0.0)?;
        check_range("angle", self.angle, 0.0, 360.0)?;
        check_range("alpha", self.alpha, 0.0, 1.0)?;
        check_range("luminosity", self.luminosity, -1.0, 1.0)?;

        if let Some(color) = &self.color {
            if !is_hex_color(color) {
                return Err(format!("color must be a #rrggbb string, got {:?}", color));
            }
        }
        if let Some(animation) = &self.animation {
            check_range("animation.speed", animation.speed, 0.0, 10.0)?;
            check_range("animation.intensity", animation.intensity, 1.0, 10.0)?;
        }
        Ok(())
    }
}

fn check_min(field: &str, value: Option<f64>, min: f64) -> Result<(), String> {
    match value {
        Some(v) if !v.is_finite() || v < min => {
            Err(format!("{} must be at least {}, got {}", field, min, v))
        }
        _ => Ok(()),
    }
}

fn check_range(field: &str, value: Option<f64>, min: f64, max: f64) -> Result<(), String> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, v
        )),
        _ => Ok(()),
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_partial_light() {
        let light = LightSource::from_value(&json!({
            "bright": 20,
            "dim": 40,
            "color": "#ffaa00",
            "animation": {"type": "torch", "speed": 3, "intensity": 2}
        }))
        .unwrap();
        assert_eq!(light.bright, Some(20.0));
        assert_eq!(light.animation.unwrap().kind.as_deref(), Some("torch"));
        assert_eq!(light.angle, None);
    }

    #[test]
    fn test_unresolved_reference_is_rejected() {
        let err = LightSource::from_value(&json!({"bright": "@actor.missing"})).unwrap_err();
        assert!(err.contains("invalid light data"));
    }

    #[test]
    fn test_ranges_are_enforced() {
        assert!(LightSource::from_value(&json!({"bright": -5})).is_err());
        assert!(LightSource::from_value(&json!({"angle": 400})).is_err());
        assert!(LightSource::from_value(&json!({"alpha": 1.5})).is_err());
        assert!(LightSource::from_value(&json!({"luminosity": -2})).is_err());
        assert!(LightSource::from_value(&json!({"animation": {"intensity": 0}})).is_err());
        assert!(LightSource::from_value(&json!({"color": "orange"})).is_err());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = LightSource::from_value(&json!({"radius": 10})).unwrap_err();
        assert!(err.contains("radius"));
    }
}
