//! Manifest output errors.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}
