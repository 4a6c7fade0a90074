//! Runtime configuration.
//!
//! Configuration can be loaded from a `[retroapollo]` TOML table.
//!
//! # Example Configuration
//!
//! ```toml
//! [retroapollo]
//! validate_eagerly = true
//! strict_variables = true
//! max_variables = 32
//! ```

use serde::{Deserialize, Serialize};

use crate::error::RetroApolloError;

/// Runtime configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetroApolloConfig {
    /// Build every method binding when a service is created instead of on
    /// first call, so mapping errors surface at creation time.
    /// Default: false
    #[serde(default = "default_validate_eagerly")]
    pub validate_eagerly: bool,

    /// Require every method parameter to be referenced as `$name` in the
    /// operation document.
    /// Default: true
    #[serde(default = "default_strict_variables")]
    pub strict_variables: bool,

    /// Maximum number of parameters (GraphQL variables) per method.
    /// Default: 64
    #[serde(default = "default_max_variables")]
    pub max_variables: usize,
}

fn default_validate_eagerly() -> bool {
    false
}

fn default_strict_variables() -> bool {
    true
}

fn default_max_variables() -> usize {
    64
}

impl Default for RetroApolloConfig {
    fn default() -> Self {
        Self {
            validate_eagerly: default_validate_eagerly(),
            strict_variables: default_strict_variables(),
            max_variables: default_max_variables(),
        }
    }
}

impl RetroApolloConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `RetroApolloError::InvalidConfig` if a value is out of range.
    pub fn validate(&self) -> Result<(), RetroApolloError> {
        if self.max_variables == 0 {
            return Err(RetroApolloError::InvalidConfig(
                "retroapollo.max_variables must be > 0".into(),
            ));
        }
        Ok(())
    }
}
