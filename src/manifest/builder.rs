//! Manifest construction.

use serde_json::Value;
use tracing::info;
use webconf_registry::Registry;

use super::defaults::inject_defaults;
use super::inherit::{inherit_application_hierarchies, inherit_location_hierarchies};
use super::locator::Scope;
use super::model::{HierarchyMember, Manifest, OptionEntry};
use super::reverse::reverse_value_hierarchies;

/// Collects explicit settings, then finalizes them into a manifest.
///
/// `finish` consumes the builder, so the finalization pipeline (reversal,
/// defaults, inheritance) runs exactly once per manifest.
#[derive(Debug)]
pub struct ManifestBuilder<'r> {
    manifest: Manifest,
    registry: &'r Registry,
}

impl<'r> ManifestBuilder<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            manifest: Manifest::new(),
            registry,
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Find or create the entry for `option` at `scope`.
    pub fn locate(&mut self, scope: &Scope<'_>, option: &str) -> &mut OptionEntry {
        self.manifest.locate(scope, option)
    }

    /// Record an explicit setting read from `path:line`.
    pub fn record(
        &mut self,
        scope: &Scope<'_>,
        option: &str,
        path: &str,
        line: u64,
        value: Value,
    ) -> &mut HierarchyMember {
        let member = self.locate(scope, option).record_explicit(path, line);
        member.value = Some(value);
        member
    }

    /// The manifest collected so far, hierarchies still in recording order.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Reverse hierarchies, inject defaults and apply inheritance.
    pub fn finish(self) -> Manifest {
        let mut manifest = self.manifest;

        let reversed = reverse_value_hierarchies(&mut manifest);
        inject_defaults(&mut manifest, self.registry);
        inherit_application_hierarchies(&mut manifest);
        inherit_location_hierarchies(&mut manifest);

        info!(
            explicit_entries = reversed,
            entries = manifest.option_entry_count(),
            applications = manifest.application_configuration.len(),
            locations = manifest.location_count(),
            "manifest finalized"
        );
        manifest
    }
}
