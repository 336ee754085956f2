//! Layer configuration.

use serde::{Deserialize, Serialize};

use crate::columns::DEFAULT_TAB_SIZE;
use crate::error::ConfigError;

/// Host-facing configuration of the visual formatting layer.
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```rust
/// use fmt_layer::LayerConfig;
///
/// let config = LayerConfig::from_json_str(r#"{ "fold_placeholder": "·" }"#).unwrap();
/// assert!(config.enabled);
/// assert_eq!(config.fold_placeholder, "·");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Whether the layer is shown.
    pub enabled: bool,
    /// Text rendered in place of collapsed whitespace folds.
    pub fold_placeholder: String,
    /// Whether computed elements are stored for replay on the next editor open.
    pub persist_snapshots: bool,
    /// Tab width used when an editor does not report one.
    pub default_tab_size: usize,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fold_placeholder: String::new(),
            persist_snapshots: true,
            default_tab_size: DEFAULT_TAB_SIZE,
        }
    }
}

impl LayerConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_tab_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "default_tab_size",
                message: "must be at least 1".to_string(),
            });
        }
        if self.fold_placeholder.contains('\n') {
            return Err(ConfigError::InvalidValue {
                field: "fold_placeholder",
                message: "must not contain line breaks".to_string(),
            });
        }
        Ok(())
    }
}
