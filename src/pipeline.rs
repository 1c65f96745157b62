//! Build pipeline
//!
//! Load the configuration tree, drive it into a manifest, persist the
//! manifest and report what happened.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use webconf_registry::Registry;
use webconf_tree::{ConfigTree, TreeError};

use crate::config::{sha256_hex, EffectiveSettings, SettingsError, SettingsSource};
use crate::driver::{build_manifest, DriverError, DriverOptions};
use crate::manifest::Manifest;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration tree: {0}")]
    Tree(#[from] TreeError),

    #[error("{0}")]
    Driver(#[from] DriverError),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Outcome of one build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub built_at: DateTime<Utc>,

    pub input_path: String,

    /// SHA-256 of the raw input bytes
    pub input_digest: String,

    pub output_path: PathBuf,

    /// False when the manifest could not be written
    pub written: bool,

    pub applications: usize,
    pub locations: usize,
    pub option_entries: usize,

    /// Settings layers that contributed
    pub settings_sources: Vec<SettingsSource>,
}

impl BuildReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_human(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Input:        {} (sha256 {})\n",
            self.input_path, self.input_digest
        ));
        if self.written {
            out.push_str(&format!("Manifest:     {}\n", self.output_path.display()));
        } else {
            out.push_str(&format!(
                "Manifest:     {} (NOT WRITTEN)\n",
                self.output_path.display()
            ));
        }
        out.push_str(&format!("Applications: {}\n", self.applications));
        out.push_str(&format!("Locations:    {}\n", self.locations));
        out.push_str(&format!("Entries:      {}\n", self.option_entries));
        out.push_str(&format!("Built at:     {}", self.built_at.to_rfc3339()));
        out
    }
}

/// Read and parse a configuration tree, returning it with the digest of the
/// raw bytes.
pub fn load_tree(path: &Path) -> Result<(ConfigTree, String), PipelineError> {
    let bytes = fs::read(path).map_err(|source| PipelineError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let digest = sha256_hex(&bytes);
    let tree = ConfigTree::parse_bytes(path, &bytes)?;
    info!(
        path = %path.display(),
        servers = tree.servers.len(),
        locations = tree.location_count(),
        "loaded configuration tree"
    );
    Ok((tree, digest))
}

/// Build the manifest for the tree at `input` without writing it.
pub fn resolve(
    input: &Path,
    effective: &EffectiveSettings,
    registry: &Registry,
) -> Result<(Manifest, String), PipelineError> {
    let (tree, digest) = load_tree(input)?;
    let options = DriverOptions::from(effective.settings());
    let manifest = build_manifest(&tree, registry, &options)?;
    Ok((manifest, digest))
}

/// Build the manifest and write it to the configured output path.
///
/// A failed write is reported through `BuildReport::written`, not as an
/// error.
pub fn run(
    input: &Path,
    effective: &EffectiveSettings,
    registry: &Registry,
) -> Result<(Manifest, BuildReport), PipelineError> {
    let settings = effective.settings();
    let (manifest, input_digest) = resolve(input, effective, registry)?;
    let written = manifest.persist(&settings.output_path, settings.pretty);

    let report = BuildReport {
        built_at: Utc::now(),
        input_path: input.display().to_string(),
        input_digest,
        output_path: settings.output_path.clone(),
        written,
        applications: manifest.application_configuration.len(),
        locations: manifest.location_count(),
        option_entries: manifest.option_entry_count(),
        settings_sources: effective.sources.clone(),
    };
    Ok((manifest, report))
}
