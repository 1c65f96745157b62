//! Configuration tree driver.
//!
//! Walks a parsed web server configuration depth-first (http block,
//! virtual hosts, locations, `if` blocks) and records every recognized
//! directive in a [`ManifestBuilder`] at the scope its option belongs to.

mod error;
mod group;

pub use error::DriverError;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};
use webconf_registry::{accumulate, cast_args, OptionScope, OptionSpec, Registry};
use webconf_tree::{Conditional, ConfigTree, Directive, Location, MatcherKind, VirtualHost};

use crate::config::Settings;
use crate::manifest::{LocationDescriptor, Manifest, ManifestBuilder, Scope, VirtualHostDescriptor};
use group::ScopeValues;

/// Driver knobs taken from the tool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    /// Server prefix relative roots are resolved against.
    pub prefix: String,
    pub default_root: String,
    pub default_environment: String,
    /// When false, regex locations are recorded as prefix locations.
    pub regex_locations: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for DriverOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            prefix: settings.prefix.clone(),
            default_root: settings.default_root.clone(),
            default_environment: settings.default_environment.clone(),
            regex_locations: settings.regex_locations,
        }
    }
}

/// Walk `tree` and produce the finalized manifest.
pub fn build_manifest(
    tree: &ConfigTree,
    registry: &Registry,
    options: &DriverOptions,
) -> Result<Manifest, DriverError> {
    let mut driver = Driver {
        builder: ManifestBuilder::new(registry),
        options,
    };
    driver.walk(tree)?;
    Ok(driver.builder.finish())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Http,
    Server,
    Location,
    Conditional,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::Http => "http block",
            Level::Server => "server block",
            Level::Location => "location block",
            Level::Conditional => "if block",
        }
    }
}

/// The value a context sets for one option, and the directive it was last
/// set by.
struct Collected<'c> {
    spec: &'c OptionSpec,
    directive: &'c Directive,
    value: Value,
}

type ContextSettings<'c> = IndexMap<String, Collected<'c>>;

struct Context<'c> {
    group: &'c str,
    virtual_host: &'c VirtualHostDescriptor,
    location: Option<&'c LocationDescriptor>,
}

struct Driver<'a> {
    builder: ManifestBuilder<'a>,
    options: &'a DriverOptions,
}

impl<'a> Driver<'a> {
    fn walk(&mut self, tree: &ConfigTree) -> Result<(), DriverError> {
        let registry = self.builder.registry();
        let settings = collect(registry, &tree.directives, Level::Http)?;
        let values = ScopeValues::default()
            .child(tree.root.as_deref(), |name| string_value(&settings, name));

        let no_host = VirtualHostDescriptor::default();
        self.record(
            settings,
            &Context {
                group: "",
                virtual_host: &no_host,
                location: None,
            },
        );

        for server in &tree.servers {
            self.walk_server(server, &values)?;
        }
        Ok(())
    }

    fn walk_server(
        &mut self,
        server: &VirtualHost,
        parent: &ScopeValues,
    ) -> Result<(), DriverError> {
        let registry = self.builder.registry();
        let virtual_host = VirtualHostDescriptor::new(server.server_names.iter().cloned());
        let settings = collect(registry, &server.directives, Level::Server)?;
        let values = parent.child(server.root.as_deref(), |name| string_value(&settings, name));
        let group = self.group_for(&virtual_host, &values);
        debug!(server_names = ?virtual_host.server_names, group = %group, "walking server block");

        self.record(
            settings,
            &Context {
                group: &group,
                virtual_host: &virtual_host,
                location: None,
            },
        );

        for conditional in &server.conditions {
            self.walk_conditional(conditional, &values, &virtual_host, None)?;
        }
        for location in &server.locations {
            self.walk_location(location, &values, &virtual_host)?;
        }
        Ok(())
    }

    fn walk_location(
        &mut self,
        location: &Location,
        parent: &ScopeValues,
        virtual_host: &VirtualHostDescriptor,
    ) -> Result<(), DriverError> {
        let kind = match location.matcher.kind {
            MatcherKind::Regex if !self.options.regex_locations => {
                warn!(
                    pattern = %location.matcher.value,
                    "regex locations are disabled, treating as prefix"
                );
                MatcherKind::Prefix
            }
            kind => kind,
        };
        let descriptor = LocationDescriptor::new(kind, location.matcher.value.clone());

        let registry = self.builder.registry();
        let settings = collect(registry, &location.directives, Level::Location)?;
        let values = parent.child(location.root.as_deref(), |name| string_value(&settings, name));
        let group = self.group_for(virtual_host, &values);

        self.record(
            settings,
            &Context {
                group: &group,
                virtual_host,
                location: Some(&descriptor),
            },
        );

        for conditional in &location.conditions {
            self.walk_conditional(conditional, &values, virtual_host, Some(&descriptor))?;
        }
        for nested in &location.locations {
            self.walk_location(nested, &values, virtual_host)?;
        }
        Ok(())
    }

    /// An `if` block records at its enclosing location, or at server level
    /// when it sits directly in a server block.
    fn walk_conditional(
        &mut self,
        conditional: &Conditional,
        parent: &ScopeValues,
        virtual_host: &VirtualHostDescriptor,
        location: Option<&LocationDescriptor>,
    ) -> Result<(), DriverError> {
        let registry = self.builder.registry();
        let settings = collect(registry, &conditional.directives, Level::Conditional)?;
        let values = parent.child(None, |name| string_value(&settings, name));
        let group = self.group_for(virtual_host, &values);
        debug!(condition = %conditional.condition, "walking if block");

        self.record(
            settings,
            &Context {
                group: &group,
                virtual_host,
                location,
            },
        );
        Ok(())
    }

    /// Servers without names belong to the global context.
    fn group_for(&self, virtual_host: &VirtualHostDescriptor, values: &ScopeValues) -> String {
        if virtual_host.server_names.is_empty() {
            String::new()
        } else {
            values.app_group_name(self.options)
        }
    }

    fn record(&mut self, settings: ContextSettings<'_>, context: &Context<'_>) {
        for (name, collected) in settings {
            let scope = match collected.spec.scope {
                OptionScope::Global => Scope::Global,
                OptionScope::Application => Scope::Application {
                    group: context.group,
                },
                OptionScope::Location => Scope::Location {
                    group: context.group,
                    virtual_host: context.virtual_host,
                    location: context.location,
                },
            };
            self.builder.record(
                &scope,
                &name,
                collected.directive.source_path(),
                collected.directive.source_line(),
                collected.value,
            );
        }
    }
}

/// Cast and merge the directives of one context, keyed by option name in
/// first-seen order.
fn collect<'c>(
    registry: &'c Registry,
    directives: &'c [Directive],
    level: Level,
) -> Result<ContextSettings<'c>, DriverError> {
    let mut settings = ContextSettings::new();

    for directive in directives {
        let spec = registry
            .get(&directive.name)
            .ok_or_else(|| DriverError::unknown(directive))?;
        if spec.scope == OptionScope::Global && level != Level::Http {
            return Err(DriverError::misplaced(directive, level.as_str()));
        }

        let value =
            cast_args(spec, &directive.args).map_err(|e| DriverError::invalid(directive, e))?;

        match settings.get_mut(&spec.name) {
            Some(existing) => {
                accumulate(spec, &mut existing.value, value)
                    .map_err(|e| DriverError::invalid(directive, e))?;
                existing.directive = directive;
            }
            None => {
                settings.insert(
                    spec.name.clone(),
                    Collected {
                        spec,
                        directive,
                        value,
                    },
                );
            }
        }
    }

    Ok(settings)
}

fn string_value(settings: &ContextSettings<'_>, name: &str) -> Option<String> {
    settings
        .get(name)
        .and_then(|c| c.value.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::SourceType;
    use serde_json::json;
    use webconf_registry::RegistryError;
    use webconf_tree::COMMAND_LINE_SOURCE;

    fn build(toml: &str) -> Result<Manifest, DriverError> {
        let tree = ConfigTree::from_toml_str(toml).unwrap();
        build_manifest(&tree, &Registry::builtin(), &DriverOptions::default())
    }

    const SITE: &str = r#"
root = "/srv/shop/public"

[[directives]]
name = "max_pool_size"
args = ["12"]
file = "/etc/nginx/nginx.conf"
line = 10

[[directives]]
name = "min_instances"
args = ["2"]
file = "/etc/nginx/nginx.conf"
line = 11

[[servers]]
server_names = ["shop.example.com"]

[[servers.directives]]
name = "enabled"
args = ["on"]
file = "/etc/nginx/sites/shop.conf"
line = 3

[[servers.locations]]
matcher = { type = "prefix", value = "/api" }

[[servers.locations.directives]]
name = "pass_headers"
args = ["X-Request-Id"]
file = "/etc/nginx/sites/shop.conf"
line = 8

[[servers.locations.directives]]
name = "pass_headers"
args = ["X-Forwarded-For"]
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

    const GROUP: &str = "/srv/shop (production)";

    #[test]
    fn test_global_directive_recorded_before_default() {
        let manifest = build(SITE).unwrap();
        let entry = &manifest.global_configuration["max_pool_size"];
        assert_eq!(entry.effective_value(), Some(&json!(12)));
        assert_eq!(entry.value_hierarchy[0].source.line, Some(10));
        assert_eq!(entry.value_hierarchy.last().unwrap().value, Some(json!(6)));
    }

    #[test]
    fn test_http_block_application_option_goes_to_default_application() {
        let manifest = build(SITE).unwrap();
        let entry = &manifest.default_application_configuration["min_instances"];
        assert_eq!(entry.effective_value(), Some(&json!(2)));

        let app = manifest.application(GROUP).unwrap();
        assert_eq!(app.options["min_instances"].effective_value(), Some(&json!(2)));
    }

    #[test]
    fn test_server_and_location_settings() {
        let manifest = build(SITE).unwrap();
        let app = manifest.application(GROUP).unwrap();

        let enabled = &app.default_location_configuration["enabled"];
        assert_eq!(enabled.effective_value(), Some(&json!(true)));

        assert_eq!(app.locations.len(), 1);
        let location = &app.locations[0];
        assert_eq!(location.web_server_virtual_host.server_names, vec!["shop.example.com"]);
        assert_eq!(location.location_matcher.value, "/api");

        let headers = &location.options["pass_headers"];
        assert_eq!(headers.value_hierarchy[0].source.line, Some(9));
        assert_eq!(
            headers.effective_value(),
            Some(&json!(["X-Request-Id", "X-Forwarded-For"]))
        );
    }

    #[test]
    fn test_conditional_shares_location_entry() {
        let manifest = build(SITE).unwrap();
        let app = manifest.application(GROUP).unwrap();
        assert_eq!(app.locations.len(), 1);
        assert_eq!(
            app.locations[0].options["buffer_response"].effective_value(),
            Some(&json!(true))
        );
    }

    #[test]
    fn test_unknown_option() {
        let err = build(
            r#"
[[directives]]
name = "no_such_option"
args = ["1"]
file = "nginx.conf"
line = 4
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DriverError::UnknownOption { ref name, line: 4, .. } if name == "no_such_option"
        ));
    }

    #[test]
    fn test_global_option_outside_http_block() {
        let err = build(
            r#"
[[servers]]
server_names = ["a.test"]

[[servers.directives]]
name = "max_pool_size"
args = ["4"]
"#,
        )
        .unwrap_err();
        match err {
            DriverError::MisplacedDirective { context, path, line, .. } => {
                assert_eq!(context, "server block");
                assert_eq!(path, COMMAND_LINE_SOURCE);
                assert_eq!(line, 0);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_repeated_scalar_in_one_context() {
        let err = build(
            r#"
[[directives]]
name = "log_level"
args = ["1"]

[[directives]]
name = "log_level"
args = ["2"]
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DriverError::InvalidDirective { source: RegistryError::InvalidValue { .. }, .. }
        ));
    }

    #[test]
    fn test_bad_value() {
        let err = build(
            r#"
[[directives]]
name = "max_pool_size"
args = ["-1"]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("max_pool_size"));
    }

    #[test]
    fn test_nameless_server_is_global_context() {
        let manifest = build(
            r#"
[[servers]]

[[servers.directives]]
name = "sticky_sessions"
args = ["on"]

[[servers.locations]]
matcher = { type = "exact", value = "/" }

[[servers.locations.directives]]
name = "environment"
args = ["staging"]
"#,
        )
        .unwrap();

        assert!(manifest.application_configuration.is_empty());
        let entry = &manifest.default_location_configuration["sticky_sessions"];
        assert_eq!(entry.effective_value(), Some(&json!(true)));
        assert_eq!(entry.value_hierarchy[0].source.kind, SourceType::WebServerConfig);
        assert_eq!(
            manifest.default_application_configuration["environment"].effective_value(),
            Some(&json!("staging"))
        );
    }

    #[test]
    fn test_environment_changes_group() {
        let manifest = build(
            r#"
[[servers]]
server_names = ["a.test"]
root = "/srv/a/public"

[[servers.directives]]
name = "environment"
args = ["staging"]

[[servers]]
server_names = ["b.test"]
root = "/srv/a/public"

[[servers.directives]]
name = "app_group_name"
args = ["b"]
"#,
        )
        .unwrap();

        let groups: Vec<_> = manifest.application_configuration.keys().cloned().collect();
        assert_eq!(groups, vec!["/srv/a (staging)".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_regex_fallback_to_prefix() {
        let tree = ConfigTree::from_toml_str(
            r#"
[[servers]]
server_names = ["a.test"]

[[servers.locations]]
matcher = { type = "regex", value = "^/assets/" }

[[servers.locations.directives]]
name = "enabled"
args = ["on"]
"#,
        )
        .unwrap();

        let options = DriverOptions {
            regex_locations: false,
            ..DriverOptions::default()
        };
        let manifest = build_manifest(&tree, &Registry::builtin(), &options).unwrap();
        let app = manifest.application("/usr/local/nginx (production)").unwrap();
        assert_eq!(app.locations[0].location_matcher.kind, MatcherKind::Prefix);

        let manifest =
            build_manifest(&tree, &Registry::builtin(), &DriverOptions::default()).unwrap();
        let app = manifest.application("/usr/local/nginx (production)").unwrap();
        assert_eq!(app.locations[0].location_matcher.kind, MatcherKind::Regex);
    }

    #[test]
    fn test_same_location_in_two_servers_sharing_a_name() {
        let manifest = build(
            r#"
[[servers]]
server_names = ["a.test", "www.a.test"]

[[servers.locations]]
matcher = { type = "prefix", value = "/" }

[[servers.locations.directives]]
name = "enabled"
args = ["on"]

[[servers]]
server_names = ["WWW.A.TEST"]

[[servers.locations]]
matcher = { type = "prefix", value = "/" }

[[servers.locations.directives]]
name = "sticky_sessions"
args = ["on"]
"#,
        )
        .unwrap();

        let app = manifest.application("/usr/local/nginx (production)").unwrap();
        assert_eq!(app.locations.len(), 1);
        assert!(app.locations[0].options.contains_key("enabled"));
        assert!(app.locations[0].options.contains_key("sticky_sessions"));
    }
}
