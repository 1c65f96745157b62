//! Settings merge logic
//!
//! - Objects: deep-merge by key
//! - Arrays: replace
//! - Scalars: override

use serde_json::Value;

/// Deep merge two JSON values; `overlay` wins except where both sides are
/// objects, which merge key by key.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Merge layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let result = deep_merge(
            json!({"prefix": "/usr/local/nginx"}),
            json!({"prefix": "/opt/nginx"}),
        );
        assert_eq!(result["prefix"], "/opt/nginx");
    }

    #[test]
    fn test_array_replace() {
        let result = deep_merge(json!({"roots": ["a", "b"]}), json!({"roots": ["c"]}));
        assert_eq!(result["roots"], json!(["c"]));
    }

    #[test]
    fn test_nested_objects_merge() {
        let base = json!({"paths": {"prefix": "/usr/local/nginx", "root": "html"}});
        let overlay = json!({"paths": {"root": "public"}});
        let result = deep_merge(base, overlay);
        assert_eq!(result["paths"]["prefix"], "/usr/local/nginx");
        assert_eq!(result["paths"]["root"], "public");
    }

    #[test]
    fn test_merge_layers_last_wins() {
        let result = merge_layers(vec![
            json!({"pretty": true, "default_root": "html"}),
            json!({"default_root": "public"}),
            json!({"pretty": false}),
        ]);
        assert_eq!(result, json!({"pretty": false, "default_root": "public"}));
    }

    #[test]
    fn test_merge_no_layers_is_null() {
        assert!(merge_layers(Vec::new()).is_null());
    }
}
