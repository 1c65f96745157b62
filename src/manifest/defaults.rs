//! Default injection.
//!
//! Runs after the hierarchy reversal, so default members land directly in
//! their final position: last, as the least specific contribution.

use tracing::debug;
use webconf_registry::{DefaultValue, OptionScope, Registry};

use super::model::{Manifest, OptionEntry, OptionMap};

/// Append every registered option's default to its global entry, then give
/// the top-level default containers a copy of each global entry they lack.
pub(crate) fn inject_defaults(manifest: &mut Manifest, registry: &Registry) {
    for spec in registry.iter() {
        let entry = manifest
            .global_configuration
            .entry(spec.name.clone())
            .or_default();
        append_default(entry, &spec.default);
    }

    let Manifest {
        global_configuration,
        default_application_configuration,
        default_location_configuration,
        ..
    } = manifest;

    let mut copied = 0;
    for spec in registry.iter() {
        let target = match spec.scope {
            OptionScope::Global => continue,
            OptionScope::Application => &mut *default_application_configuration,
            OptionScope::Location => &mut *default_location_configuration,
        };
        if copy_if_absent(target, global_configuration, &spec.name) {
            copied += 1;
        }
    }

    debug!(options = registry.len(), copied, "injected defaults");
}

fn append_default(entry: &mut OptionEntry, default: &DefaultValue) {
    match default {
        DefaultValue::Static(value) => {
            entry.record_static_default(value.clone());
        }
        DefaultValue::Dynamic(description) => {
            entry.record_dynamic_default(description.clone());
        }
    }
}

fn copy_if_absent(target: &mut OptionMap, source: &OptionMap, name: &str) -> bool {
    if target.contains_key(name) {
        return false;
    }
    match source.get(name) {
        Some(entry) => {
            target.insert(name.to_string(), entry.clone());
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::locator::Scope;
    use crate::manifest::model::SourceType;
    use serde_json::json;
    use webconf_registry::{OptionKind, OptionSpec};

    fn registry() -> Registry {
        Registry::new(vec![
            OptionSpec::with_static(
                "max_pool_size",
                OptionScope::Global,
                OptionKind::UnsignedInteger,
                json!(6),
            ),
            OptionSpec::with_dynamic(
                "user",
                OptionScope::Application,
                OptionKind::String,
                "owner of the startup file",
            ),
            OptionSpec::with_static(
                "enabled",
                OptionScope::Location,
                OptionKind::Boolean,
                json!(false),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_defaults_land_in_global_section() {
        let mut manifest = Manifest::new();
        inject_defaults(&mut manifest, &registry());

        let entry = &manifest.global_configuration["max_pool_size"];
        assert_eq!(entry.value_hierarchy.len(), 1);
        assert_eq!(entry.value_hierarchy[0].source.kind, SourceType::Default);
        assert_eq!(entry.effective_value(), Some(&json!(6)));

        let entry = &manifest.global_configuration["user"];
        assert_eq!(
            entry.value_hierarchy[0].source.kind,
            SourceType::DynamicDefaultDescription
        );
    }

    #[test]
    fn test_default_appended_after_explicit_global_setting() {
        let mut manifest = Manifest::new();
        manifest
            .locate(&Scope::Global, "max_pool_size")
            .record_explicit("nginx.conf", 3)
            .value = Some(json!(20));

        inject_defaults(&mut manifest, &registry());

        let entry = &manifest.global_configuration["max_pool_size"];
        assert_eq!(entry.effective_value(), Some(&json!(20)));
        assert_eq!(entry.value_hierarchy[1].source.kind, SourceType::Default);
    }

    #[test]
    fn test_scope_defaults_copied_only_when_absent() {
        let mut manifest = Manifest::new();
        manifest
            .locate(&Scope::Application { group: "" }, "user")
            .record_explicit("nginx.conf", 9)
            .value = Some(json!("deploy"));

        inject_defaults(&mut manifest, &registry());

        // Present: left untouched.
        let entry = &manifest.default_application_configuration["user"];
        assert_eq!(entry.value_hierarchy.len(), 1);
        assert_eq!(entry.effective_value(), Some(&json!("deploy")));

        // Absent: verbatim copy of the global entry.
        assert_eq!(
            manifest.default_location_configuration["enabled"],
            manifest.global_configuration["enabled"]
        );

        // Global-only options stay global.
        assert!(!manifest
            .default_application_configuration
            .contains_key("max_pool_size"));
        assert!(!manifest
            .default_location_configuration
            .contains_key("max_pool_size"));
    }
}
