use thiserror::Error;

/// Failure of a query against the host model.
///
/// A method without a knowable source location is not an error, see
/// [`crate::origin::Origin::Unresolved`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InspectError {
    #[error("Type error: expected {expected}, got {actual}")]
    TypeKind { expected: String, actual: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl InspectError {
    pub fn type_kind(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeKind {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_type_kind(&self) -> bool {
        matches!(self, Self::TypeKind { .. })
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// Failure while building an object model or loading configuration.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Uninitialized constant {0}")]
    UnknownConstant(String),

    #[error("Constant {0} is already defined")]
    DuplicateConstant(String),

    #[error("Undefined method `{name}' for `{owner}'")]
    UndefinedMethod { owner: String, name: String },

    #[error("Invalid model: {0}")]
    InvalidModel(String),
}
