//! Web server configuration manifest
//!
//! Turns the configuration contexts of a web server (http block, virtual
//! hosts, locations) into a manifest that records, for every recognized
//! option at every scope, the chain of values that contribute to it and
//! where each came from.

pub mod config;
pub mod driver;
pub mod manifest;
pub mod pipeline;

pub use config::{EffectiveSettings, Settings, SettingsError};
pub use driver::{build_manifest, DriverError, DriverOptions};
pub use manifest::{
    LocationDescriptor, Manifest, ManifestBuilder, ManifestError, OptionEntry, Scope,
    VirtualHostDescriptor,
};
pub use pipeline::{BuildReport, PipelineError};
pub use webconf_registry::{OptionScope, Registry};
pub use webconf_tree::ConfigTree;
