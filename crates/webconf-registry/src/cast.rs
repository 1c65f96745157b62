//! Directive argument casting.
//!
//! The host server hands over directive arguments as plain strings; the
//! manifest stores them as typed JSON according to the option kind.

use serde_json::{Map, Value};

use crate::error::RegistryError;
use crate::option::{OptionKind, OptionSpec};

/// Cast the arguments of a single directive into a JSON value.
pub fn cast_args(spec: &OptionSpec, args: &[String]) -> Result<Value, RegistryError> {
    match spec.kind {
        OptionKind::StringArray => {
            if args.is_empty() {
                return Err(RegistryError::invalid(&spec.name, "expected at least one argument"));
            }
            Ok(Value::Array(args.iter().cloned().map(Value::String).collect()))
        }
        OptionKind::KeyValueTable => match args {
            [key, value] => {
                let mut table = Map::new();
                table.insert(key.clone(), Value::String(value.clone()));
                Ok(Value::Object(table))
            }
            _ => Err(RegistryError::invalid(
                &spec.name,
                format!("expected a key and a value, got {} argument(s)", args.len()),
            )),
        },
        kind => {
            let arg = match args {
                [arg] => arg.as_str(),
                _ => {
                    return Err(RegistryError::invalid(
                        &spec.name,
                        format!("expected exactly one argument, got {}", args.len()),
                    ))
                }
            };
            cast_scalar(&spec.name, kind, arg)
        }
    }
}

fn cast_scalar(name: &str, kind: OptionKind, arg: &str) -> Result<Value, RegistryError> {
    match kind {
        OptionKind::String => Ok(Value::String(arg.to_string())),
        OptionKind::Path => {
            if arg.is_empty() {
                Err(RegistryError::invalid(name, "path must not be empty"))
            } else {
                Ok(Value::String(arg.to_string()))
            }
        }
        OptionKind::Integer => arg.parse::<i64>().map(Value::from).map_err(|e| {
            RegistryError::invalid(name, format!("'{}' is not an integer: {}", arg, e))
        }),
        OptionKind::UnsignedInteger => arg.parse::<u64>().map(Value::from).map_err(|e| {
            RegistryError::invalid(name, format!("'{}' is not an unsigned integer: {}", arg, e))
        }),
        OptionKind::Boolean => match arg.to_ascii_lowercase().as_str() {
            "on" | "true" => Ok(Value::Bool(true)),
            "off" | "false" => Ok(Value::Bool(false)),
            _ => Err(RegistryError::invalid(
                name,
                format!("'{}' is not a boolean (expected on or off)", arg),
            )),
        },
        OptionKind::StringArray | OptionKind::KeyValueTable => {
            Err(RegistryError::invalid(name, "not a scalar option"))
        }
    }
}

/// Fold the value of a repeated directive into the value accumulated so far.
///
/// Arrays are concatenated in directive order. Tables take the later value
/// when a key repeats.
pub fn accumulate(spec: &OptionSpec, acc: &mut Value, next: Value) -> Result<(), RegistryError> {
    match (acc, next) {
        (Value::Array(items), Value::Array(more)) => {
            items.extend(more);
            Ok(())
        }
        (Value::Object(table), Value::Object(more)) => {
            for (key, value) in more {
                table.insert(key, value);
            }
            Ok(())
        }
        _ => Err(RegistryError::invalid(
            &spec.name,
            "directive may only be specified once per context",
        )),
    }
}
