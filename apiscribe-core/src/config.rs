//! Engine configuration.
//!
//! Defaults match the document shape most clients expect (`_primary` pointer,
//! no traversal bound, unknown collections rejected). A TOML fragment can
//! override any subset of the fields.

use crate::container::DynamicKey;
use crate::error::{ScribeError, ScribeResult};
use serde::{Deserialize, Serialize};

/// What document decoding does with a collection nobody registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownStoreKeyPolicy {
    /// Fail the decode with [`ScribeError::UnknownStoreKey`].
    #[default]
    Reject,
    /// Skip the collection and log a warning.
    Ignore,
}

/// Settings shared by encode, normalization and document decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScribeConfig {
    /// Top-level key of the primary pointer.
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    /// Upper bound on distinct resources encoded by one normalization pass.
    #[serde(default)]
    pub max_resources: Option<usize>,
    #[serde(default)]
    pub unknown_store_keys: UnknownStoreKeyPolicy,
}

fn default_primary_key() -> String {
    "_primary".to_string()
}

impl Default for ScribeConfig {
    fn default() -> Self {
        Self {
            primary_key: default_primary_key(),
            max_resources: None,
            unknown_store_keys: UnknownStoreKeyPolicy::default(),
        }
    }
}

impl ScribeConfig {
    /// Parses and validates a TOML fragment; missing fields take defaults.
    pub fn from_toml_str(contents: &str) -> ScribeResult<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ScribeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Returns a copy with a different primary pointer key.
    #[must_use]
    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    #[must_use]
    pub fn with_max_resources(mut self, limit: usize) -> Self {
        self.max_resources = Some(limit);
        self
    }

    #[must_use]
    pub fn with_unknown_store_keys(mut self, policy: UnknownStoreKeyPolicy) -> Self {
        self.unknown_store_keys = policy;
        self
    }

    /// Checks that the settings describe a usable document shape.
    pub fn validate(&self) -> ScribeResult<()> {
        if DynamicKey::new(&self.primary_key).is_err() {
            return Err(ScribeError::Config(format!(
                "primary_key {:?} is not a valid container key",
                self.primary_key
            )));
        }
        if self.max_resources == Some(0) {
            return Err(ScribeError::Config(
                "max_resources must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
