//! Built-in settings (layer 1)

use serde::{Deserialize, Serialize};

/// Default location of the optional settings file, relative to the working
/// directory.
pub const DEFAULT_SETTINGS_PATH: &str = ".webconf/manifest.toml";

/// Built-in default settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Where the manifest is written (default: /tmp/webconf-manifest.json)
    pub output_path: String,

    /// Server prefix relative paths are resolved against (default: /usr/local/nginx)
    pub prefix: String,

    /// Document root when none is configured (default: "html")
    pub default_root: String,

    /// Environment when none is configured (default: "production")
    pub default_environment: String,

    /// Whether regex locations are supported (default: true)
    pub regex_locations: bool,

    /// Pretty-print the manifest (default: true)
    pub pretty: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            output_path: "/tmp/webconf-manifest.json".to_string(),
            prefix: "/usr/local/nginx".to_string(),
            default_root: "html".to_string(),
            default_environment: "production".to_string(),
            regex_locations: true,
            pretty: true,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "output_path": self.output_path,
            "prefix": self.prefix,
            "default_root": self.default_root,
            "default_environment": self.default_environment,
            "regex_locations": self.regex_locations,
            "pretty": self.pretty
        })
    }
}
