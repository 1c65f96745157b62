//! Effective settings with provenance
//!
//! The merged settings plus where each contributing layer came from.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;

/// Origin of a settings layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SettingsOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing settings layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSource {
    pub origin: SettingsOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Typed view of the merged settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub output_path: PathBuf,
    pub prefix: String,
    pub default_root: String,
    pub default_environment: String,
    pub regex_locations: bool,
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let defaults = BuiltinDefaults::default();
        Self {
            output_path: PathBuf::from(defaults.output_path),
            prefix: defaults.prefix,
            default_root: defaults.default_root,
            default_environment: defaults.default_environment,
            regex_locations: defaults.regex_locations,
            pretty: defaults.pretty,
        }
    }
}

/// Effective settings with full provenance
#[derive(Debug, Clone)]
pub struct EffectiveSettings {
    settings: Settings,

    /// Contributing sources in precedence order
    pub sources: Vec<SettingsSource>,
}

impl EffectiveSettings {
    /// Build effective settings from the builtin defaults, an optional
    /// settings file (skipped when it does not exist) and CLI overrides.
    pub fn build(
        settings_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, SettingsError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![SettingsSource {
            origin: SettingsOrigin::Builtin,
            path: None,
            digest: None,
        }];

        if let Some(path) = settings_path {
            if path.exists() {
                let (value, digest) = load_toml_file(path)?;
                debug!(path = %path.display(), digest = %digest, "loaded settings file");
                layers.push(value);
                sources.push(SettingsSource {
                    origin: SettingsOrigin::File,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                });
            } else {
                debug!(path = %path.display(), "no settings file");
            }
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(SettingsSource {
                origin: SettingsOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let settings: Settings = serde_json::from_value(merge_layers(layers))
            .map_err(|e| SettingsError::ValidationError(e.to_string()))?;
        validate_settings(&settings)?;

        Ok(Self { settings, sources })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Load and parse a TOML file, returning the value and digest
fn load_toml_file(path: &Path) -> Result<(Value, String), SettingsError> {
    let bytes = fs::read(path).map_err(|e| SettingsError::IoError(e.to_string()))?;
    let digest = sha256_hex(&bytes);

    let contents = String::from_utf8(bytes)
        .map_err(|e| SettingsError::ParseError(format!("Invalid UTF-8: {}", e)))?;
    let toml_value: toml::Value = toml::from_str(&contents)
        .map_err(|e| SettingsError::ParseError(format!("TOML parse error: {}", e)))?;

    Ok((toml_to_json(toml_value), digest))
}

/// Convert a TOML value to JSON
fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if settings.output_path.as_os_str().is_empty() {
        return Err(SettingsError::ValidationError(
            "output_path must not be empty".to_string(),
        ));
    }
    if !settings.prefix.starts_with('/') {
        return Err(SettingsError::ValidationError(format!(
            "prefix must be an absolute path, got '{}'",
            settings.prefix
        )));
    }
    if settings.default_root.is_empty() {
        return Err(SettingsError::ValidationError(
            "default_root must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
