//! Manifest serialization and persistence.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::error::ManifestError;
use super::model::Manifest;

impl Manifest {
    /// Serialize to JSON, keeping section and option order.
    pub fn to_json(&self, pretty: bool) -> Result<String, ManifestError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Write the manifest to `path`.
    pub fn write_to_file(&self, path: &Path, pretty: bool) -> Result<(), ManifestError> {
        let json = self.to_json(pretty)?;
        fs::write(path, json).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Write the manifest, logging instead of failing. Returns whether the
    /// file was written.
    pub fn persist(&self, path: &Path, pretty: bool) -> bool {
        match self.write_to_file(path, pretty) {
            Ok(()) => {
                info!(path = %path.display(), "manifest written");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not write manifest");
                false
            }
        }
    }
}
