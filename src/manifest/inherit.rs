//! Hierarchy inheritance.
//!
//! After defaults are in place, every application inherits from
//! `default_application_configuration` and every location inherits from its
//! application's `default_location_configuration`, which itself inherits
//! from the top-level one. Inheriting means appending the parent's members
//! to the child's hierarchy; collection values are then unioned so the
//! winning member carries every element contributed further down.

use serde_json::Value;
use tracing::debug;

use super::model::{ApplicationContainer, Manifest, OptionEntry, OptionMap};

/// Let every application inherit from the default application section.
pub(crate) fn inherit_application_hierarchies(manifest: &mut Manifest) {
    let Manifest {
        default_application_configuration,
        application_configuration,
        ..
    } = manifest;

    for (group, app) in application_configuration.iter_mut() {
        inherit_map(&mut app.options, default_application_configuration);
        let copied = copy_missing(&mut app.options, default_application_configuration);
        debug!(group = %group, copied, "application inherited defaults");
    }
}

/// Let every location inherit from its application's location defaults,
/// after those have inherited from the top-level location defaults.
pub(crate) fn inherit_location_hierarchies(manifest: &mut Manifest) {
    let Manifest {
        default_location_configuration,
        application_configuration,
        ..
    } = manifest;

    for (group, app) in application_configuration.iter_mut() {
        let ApplicationContainer {
            default_location_configuration: app_defaults,
            locations,
            ..
        } = app;

        inherit_map(app_defaults, default_location_configuration);
        copy_missing(app_defaults, default_location_configuration);

        for location in locations.iter_mut() {
            inherit_map(&mut location.options, app_defaults);
        }
        debug!(group = %group, locations = locations.len(), "locations inherited defaults");
    }
}

/// Each entry in `child` that also exists in `parent` inherits from it.
fn inherit_map(child: &mut OptionMap, parent: &OptionMap) {
    for (name, entry) in child.iter_mut() {
        if let Some(parent_entry) = parent.get(name) {
            inherit_into(entry, parent_entry);
        }
    }
}

/// Append the parent's members, then union collection values.
pub(crate) fn inherit_into(entry: &mut OptionEntry, parent: &OptionEntry) {
    entry
        .value_hierarchy
        .extend(parent.value_hierarchy.iter().cloned());
    union_collections(entry);
}

/// Clone every option of `parent` that `child` lacks. Returns how many were
/// copied.
fn copy_missing(child: &mut OptionMap, parent: &OptionMap) -> usize {
    let mut copied = 0;
    for (name, entry) in parent {
        if !child.contains_key(name) {
            child.insert(name.clone(), entry.clone());
            copied += 1;
        }
    }
    copied
}

/// Fold collection values from the end of the hierarchy towards the front.
///
/// Only applies when the first member holds an array or an object. Pairs of
/// members whose values are not both arrays or both objects are skipped.
pub(crate) fn union_collections(entry: &mut OptionEntry) {
    let collection = matches!(
        entry.effective_value(),
        Some(Value::Array(_)) | Some(Value::Object(_))
    );
    if !collection {
        return;
    }

    let hierarchy = &mut entry.value_hierarchy;
    for i in (1..hierarchy.len()).rev() {
        let (front, back) = hierarchy.split_at_mut(i);
        let (Some(target), Some(source)) = (front[i - 1].value.as_mut(), back[0].value.as_ref())
        else {
            continue;
        };
        match (target, source) {
            (Value::Array(target), Value::Array(source)) => union_arrays(target, source),
            (Value::Object(target), Value::Object(source)) => {
                for (key, value) in source {
                    if !target.contains_key(key) {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
            _ => {}
        }
    }
}

fn union_arrays(target: &mut Vec<Value>, source: &[Value]) {
    for item in source {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}
