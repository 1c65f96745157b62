//! Tool settings
//!
//! Settings are merged from three layers:
//! 1. Built-in defaults
//! 2. Settings file (.webconf/manifest.toml)
//! 3. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::DEFAULT_SETTINGS_PATH;
pub use effective::{
    sha256_hex, EffectiveSettings, Settings, SettingsError, SettingsOrigin, SettingsSource,
};
