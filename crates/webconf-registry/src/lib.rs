//! Recognized-option registry.
//!
//! Every option the manifest knows about is described here: its name, the
//! scope it may be set in, the shape of its value and its default. The
//! registry also casts raw directive arguments into typed JSON values.

mod builtin;
mod cast;
mod error;
mod option;

pub use builtin::{builtin_options, APP_GROUP_NAME, APP_ROOT, ENVIRONMENT};
pub use cast::{accumulate, cast_args};
pub use error::RegistryError;
pub use option::{DefaultValue, OptionKind, OptionScope, OptionSpec};

use std::collections::HashMap;

/// An ordered, name-indexed set of option specifications.
#[derive(Debug, Clone)]
pub struct Registry {
    options: Vec<OptionSpec>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Build a registry, rejecting malformed entries.
    pub fn new(options: Vec<OptionSpec>) -> Result<Self, RegistryError> {
        for spec in &options {
            validate_spec(spec)?;
        }

        let mut index = HashMap::with_capacity(options.len());
        for (position, spec) in options.iter().enumerate() {
            if index.insert(spec.name.clone(), position).is_some() {
                return Err(RegistryError::DuplicateOption(spec.name.clone()));
            }
        }

        Ok(Self { options, index })
    }

    /// The built-in option table.
    pub fn builtin() -> Self {
        // The built-in table is checked by `test_builtin_registry_is_valid`.
        let options = builtin_options();
        let index = options
            .iter()
            .enumerate()
            .map(|(position, spec)| (spec.name.clone(), position))
            .collect();
        Self { options, index }
    }

    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.index.get(name).map(|&position| &self.options[position])
    }

    /// Options in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionSpec> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

fn validate_spec(spec: &OptionSpec) -> Result<(), RegistryError> {
    if spec.name.is_empty() {
        return Err(RegistryError::EmptyName);
    }

    if let DefaultValue::Static(value) = &spec.default {
        if value.is_null() {
            return Err(RegistryError::NullDefault(spec.name.clone()));
        }
        if !spec.kind.accepts(value) {
            return Err(RegistryError::DefaultKindMismatch {
                name: spec.name.clone(),
                kind: spec.kind,
            });
        }
    }

    Ok(())
}
