//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::json;
use webconf_manifest::{OptionScope, Registry};
use webconf_registry::{OptionKind, OptionSpec};

/// Path to a file under tests/fixtures
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// A small registry with one option per scope and both collection kinds.
pub fn test_registry() -> Registry {
    Registry::new(vec![
        OptionSpec::with_static(
            "pool",
            OptionScope::Global,
            OptionKind::UnsignedInteger,
            json!(6),
        ),
        OptionSpec::with_dynamic(
            "app_root",
            OptionScope::Application,
            OptionKind::Path,
            "parent directory of the document root",
        ),
        OptionSpec::with_static(
            "environment",
            OptionScope::Application,
            OptionKind::String,
            json!("production"),
        ),
        OptionSpec::with_static(
            "env_vars",
            OptionScope::Application,
            OptionKind::KeyValueTable,
            json!({}),
        ),
        OptionSpec::with_static("X", OptionScope::Location, OptionKind::String, json!("0")),
        OptionSpec::with_static(
            "headers",
            OptionScope::Location,
            OptionKind::StringArray,
            json!([]),
        ),
    ])
    .expect("test registry is valid")
}
