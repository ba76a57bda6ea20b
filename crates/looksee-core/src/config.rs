//! Introspector configuration

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ancestry::DEFAULT_MAX_ANCESTRY_STEPS;
use crate::error::LoadError;
use crate::origin::DEFAULT_MAX_INDIRECTION_DEPTH;

/// What `singleton_instance` does when handed something that is not a
/// singleton class. Fixed for the lifetime of an introspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingletonInstanceMode {
    /// Fail with a type error naming the value's actual type
    #[default]
    Strict,
    /// Report that there is no attached instance
    Lenient,
}

impl FromStr for SingletonInstanceMode {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(LoadError::InvalidConfig(format!(
                "unknown singleton mode '{}' (expected strict or lenient)",
                other
            ))),
        }
    }
}

impl fmt::Display for SingletonInstanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Lenient => f.write_str("lenient"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntrospectorConfig {
    pub singleton_mode: SingletonInstanceMode,
    /// Superclass hops allowed before an ancestry walk is treated as runaway
    pub max_ancestry_steps: usize,
    /// Indirection layers followed when resolving a method's origin
    pub max_indirection_depth: usize,
}

impl Default for IntrospectorConfig {
    fn default() -> Self {
        Self {
            singleton_mode: SingletonInstanceMode::default(),
            max_ancestry_steps: DEFAULT_MAX_ANCESTRY_STEPS,
            max_indirection_depth: DEFAULT_MAX_INDIRECTION_DEPTH,
        }
    }
}

impl IntrospectorConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, LoadError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        debug!("Loading introspector config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_singleton_mode(mut self, mode: SingletonInstanceMode) -> Self {
        self.singleton_mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if self.max_ancestry_steps == 0 {
            return Err(LoadError::InvalidConfig(
                "max_ancestry_steps must be positive".to_string(),
            ));
        }
        if self.max_indirection_depth == 0 {
            return Err(LoadError::InvalidConfig(
                "max_indirection_depth must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
