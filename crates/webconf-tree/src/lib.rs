//! Web server configuration tree.
//!
//! The host server parses its own configuration files; this crate describes
//! the result (http block, virtual hosts, locations, `if` blocks and the
//! directives set in each) so it can be handed to the manifest builder as
//! TOML or JSON.

mod error;
mod model;

pub use error::TreeError;
pub use model::{
    Conditional, ConfigTree, Directive, Location, LocationMatcher, MatcherKind, VirtualHost,
    COMMAND_LINE_SOURCE,
};

use std::path::Path;

impl ConfigTree {
    /// Parse a tree from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, TreeError> {
        let tree: ConfigTree = toml::from_str(contents)?;
        tree.validate()?;
        Ok(tree)
    }

    /// Parse a tree from JSON text.
    pub fn from_json_str(contents: &str) -> Result<Self, TreeError> {
        let tree: ConfigTree = serde_json::from_str(contents)?;
        tree.validate()?;
        Ok(tree)
    }

    /// Parse raw file bytes, picking the format from `path`. Input that is
    /// not valid UTF-8 is rejected.
    pub fn parse_bytes(path: &Path, bytes: &[u8]) -> Result<Self, TreeError> {
        let contents = std::str::from_utf8(bytes).map_err(|e| {
            TreeError::Invalid(format!("{} is not valid UTF-8: {}", path.display(), e))
        })?;
        Self::parse(path, contents)
    }

    /// Parse already-read contents, picking the format from `path`.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, TreeError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(contents),
            Some("json") => Self::from_json_str(contents),
            other => Err(TreeError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    /// Check structural constraints serde cannot express.
    pub fn validate(&self) -> Result<(), TreeError> {
        validate_directives(&self.directives, "http block")?;

        for (i, server) in self.servers.iter().enumerate() {
            let context = format!("server #{}", i + 1);
            if server.server_names.iter().any(|n| n.is_empty()) {
                return Err(TreeError::Invalid(format!("{}: empty server name", context)));
            }
            validate_directives(&server.directives, &context)?;
            for cond in &server.conditions {
                validate_directives(&cond.directives, &context)?;
            }
            for location in &server.locations {
                validate_location(location, &context)?;
            }
        }

        Ok(())
    }

    /// Number of location blocks, nested ones included.
    pub fn location_count(&self) -> usize {
        fn count(locations: &[Location]) -> usize {
            locations.iter().map(|l| 1 + count(&l.locations)).sum()
        }
        self.servers.iter().map(|s| count(&s.locations)).sum()
    }
}

fn validate_location(location: &Location, parent: &str) -> Result<(), TreeError> {
    let context = format!("{} > location '{}'", parent, location.matcher.value);
    if location.matcher.value.is_empty() {
        return Err(TreeError::Invalid(format!(
            "{}: location pattern must not be empty",
            parent
        )));
    }
    validate_directives(&location.directives, &context)?;
    for cond in &location.conditions {
        validate_directives(&cond.directives, &context)?;
    }
    for nested in &location.locations {
        validate_location(nested, &context)?;
    }
    Ok(())
}

fn validate_directives(directives: &[Directive], context: &str) -> Result<(), TreeError> {
    match directives.iter().find(|d| d.name.is_empty()) {
        Some(d) => Err(TreeError::Invalid(format!(
            "{}: directive without a name at {}:{}",
            context,
            d.source_path(),
            d.source_line()
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
root = "html"

[[directives]]
name = "max_pool_size"
args = ["12"]
file = "/etc/nginx/nginx.conf"
line = 20

[[servers]]
server_names = ["example.com", "www.example.com"]
root = "/var/www/shop/public"

[[servers.directives]]
name = "enabled"
args = ["on"]
file = "/etc/nginx/sites/shop.conf"
line = 4

[[servers.locations]]
matcher = { type = "prefix", value = "/api" }

[[servers.locations.directives]]
name = "base_uris"
args = ["/api"]
file = "/etc/nginx/sites/shop.conf"
line = 9

[[servers.locations.conditions]]
condition = "$request_method = POST"

[[servers.locations.conditions.directives]]
name = "buffer_response"
args = ["on"]
file = "/etc/nginx/sites/shop.conf"
line = 11
"#;

    #[test]
    fn test_parse_toml_tree() {
        let tree = ConfigTree::from_toml_str(SAMPLE).unwrap();
        assert_eq!(tree.root.as_deref(), Some("html"));
        assert_eq!(tree.directives[0].source_line(), 20);
        let server = &tree.servers[0];
        assert_eq!(server.server_names, vec!["example.com", "www.example.com"]);
        let location = &server.locations[0];
        assert_eq!(location.matcher, LocationMatcher::prefix("/api"));
        assert_eq!(location.conditions[0].directives[0].name, "buffer_response");
        assert_eq!(tree.location_count(), 1);
    }

    #[test]
    fn test_parse_json_tree() {
        let json = r#"{
            "servers": [{
                "server_names": ["a.test"],
                "locations": [{
                    "matcher": {"type": "exact", "value": "/ping"},
                    "locations": [{"matcher": {"type": "regex", "value": "^/ping/x"}}]
                }]
            }]
        }"#;
        let tree = ConfigTree::from_json_str(json).unwrap();
        assert!(tree.directives.is_empty());
        assert_eq!(tree.servers[0].locations[0].matcher.kind, MatcherKind::Exact);
        assert_eq!(tree.location_count(), 2);
    }

    #[test]
    fn test_reject_empty_location_pattern() {
        let json =
            r#"{"servers": [{"locations": [{"matcher": {"type": "prefix", "value": ""}}]}]}"#;
        let err = ConfigTree::from_json_str(json).unwrap_err();
        assert!(matches!(err, TreeError::Invalid(_)));
    }

    #[test]
    fn test_reject_unnamed_directive() {
        let json = r#"{"directives": [{"name": "", "args": ["1"]}]}"#;
        let err = ConfigTree::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("http block"));
    }

    #[test]
    fn test_parse_bytes_picks_format_from_extension() {
        let tree = ConfigTree::parse_bytes(Path::new("site.toml"), SAMPLE.as_bytes()).unwrap();
        assert_eq!(tree.servers.len(), 1);

        let err = ConfigTree::parse(Path::new("tree.yaml"), "").unwrap_err();
        assert!(matches!(err, TreeError::UnsupportedFormat(ref ext) if ext == "yaml"));
    }

    #[test]
    fn test_parse_bytes_rejects_invalid_utf8() {
        let mut bytes = b"[[servers]]\nserver_names = [\"stag".to_vec();
        bytes.push(0xFF);
        bytes.extend_from_slice(b"ing.test\"]\n");

        let err = ConfigTree::parse_bytes(Path::new("site.toml"), &bytes).unwrap_err();
        assert!(matches!(err, TreeError::Invalid(ref msg) if msg.contains("UTF-8")));
    }
}
