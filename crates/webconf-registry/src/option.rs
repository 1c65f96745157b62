//! Option specification types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The configuration scope an option belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionScope {
    /// Process-wide; may only be set in the http block.
    Global,
    /// Per application group.
    Application,
    /// Per location block.
    Location,
}

/// Shape of the value an option carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    String,
    Integer,
    UnsignedInteger,
    Boolean,
    Path,
    StringArray,
    KeyValueTable,
}

impl OptionKind {
    /// Whether a JSON value has the shape this kind produces.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            OptionKind::String | OptionKind::Path => value.is_string(),
            OptionKind::Integer => value.is_i64(),
            OptionKind::UnsignedInteger => value.is_u64(),
            OptionKind::Boolean => value.is_boolean(),
            OptionKind::StringArray => value
                .as_array()
                .map_or(false, |items| items.iter().all(Value::is_string)),
            OptionKind::KeyValueTable => value
                .as_object()
                .map_or(false, |table| table.values().all(Value::is_string)),
        }
    }

    /// Repeated directives of accumulating kinds build up one value
    /// instead of being rejected as duplicates.
    pub fn accumulates(&self) -> bool {
        matches!(self, OptionKind::StringArray | OptionKind::KeyValueTable)
    }
}

/// Default value of an option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    /// A value known at configuration time.
    Static(Value),
    /// A human-readable description of a default computed at runtime.
    Dynamic(String),
}

/// One recognized configuration option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub name: String,
    pub scope: OptionScope,
    pub kind: OptionKind,
    pub default: DefaultValue,
}

impl OptionSpec {
    pub fn new(
        name: impl Into<String>,
        scope: OptionScope,
        kind: OptionKind,
        default: DefaultValue,
    ) -> Self {
        Self {
            name: name.into(),
            scope,
            kind,
            default,
        }
    }

    /// Shorthand for an option with a static default.
    pub fn with_static(
        name: impl Into<String>,
        scope: OptionScope,
        kind: OptionKind,
        value: Value,
    ) -> Self {
        Self::new(name, scope, kind, DefaultValue::Static(value))
    }

    /// Shorthand for an option whose default is only known at runtime.
    pub fn with_dynamic(
        name: impl Into<String>,
        scope: OptionScope,
        kind: OptionKind,
        description: impl Into<String>,
    ) -> Self {
        Self::new(name, scope, kind, DefaultValue::Dynamic(description.into()))
    }
}
