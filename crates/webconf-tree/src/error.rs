//! Tree loading errors.

/// Errors raised while parsing or validating a configuration tree.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported tree format '{0}' (expected .toml or .json)")]
    UnsupportedFormat(String),

    #[error("invalid tree: {0}")]
    Invalid(String),
}
