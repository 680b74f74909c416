//! Checking-layer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::DEFAULT_TOLERANCE;
use crate::error::ConfigError;

/// Options for validation and classification.
///
/// Loadable from TOML; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Run geometric checks in addition to topological ones.
    pub check_geometry: bool,
    /// Log one warning per defect found by the validator.
    pub dump: bool,
    /// Point classification tolerance, in model units.
    pub classify_tolerance: f64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            check_geometry: true,
            dump: false,
            classify_tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl CheckConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.classify_tolerance.is_finite() || self.classify_tolerance < 0.0 {
            return Err(ConfigError::Invalid(
                "classify_tolerance must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }
}
