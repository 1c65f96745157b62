//! Registry error types.

use crate::option::OptionKind;

/// Errors raised while building a registry or casting directive arguments.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("option name must not be empty")]
    EmptyName,

    #[error("option '{0}' is registered more than once")]
    DuplicateOption(String),

    #[error("option '{0}' has a null static default")]
    NullDefault(String),

    #[error("static default of option '{name}' is not a valid {kind:?} value")]
    DefaultKindMismatch { name: String, kind: OptionKind },

    #[error("invalid value for option '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

impl RegistryError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        RegistryError::InvalidValue {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
