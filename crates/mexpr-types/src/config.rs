//! Math configuration carried by every execution environment.

use serde::{Deserialize, Serialize};

use crate::ExprError;

/// Numeric settings handed to every execution environment.
///
/// The default registry reads `epsilon`. `precision` and `predictable` are
/// carried for hosts that plug in their own registry; here they are only
/// checked by [`MathConfig::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MathConfig {
    /// Relative tolerance of `equal` and `unequal`.
    pub epsilon: f64,
    /// Significant digits requested from a host numeric backend.
    pub precision: u32,
    /// Ask a host backend to return one result type per operation.
    pub predictable: bool,
}

impl Default for MathConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-12,
            precision: 64,
            predictable: false,
        }
    }
}

impl MathConfig {
    /// Parse a configuration from JSON; omitted fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ExprError> {
        serde_json::from_str(json).map_err(|e| ExprError::TypeConfiguration(e.to_string()))
    }

    /// Check that the configuration describes a usable numeric context.
    pub fn validate(&self) -> Result<(), ExprError> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(ExprError::TypeConfiguration(format!(
                "epsilon must be a positive finite number, got {}",
                self.epsilon
            )));
        }
        if self.precision == 0 {
            return Err(ExprError::TypeConfiguration(
                "precision must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
