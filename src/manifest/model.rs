//! Manifest document types.
//!
//! The manifest serializes to four top-level sections:
//! `global_configuration`, `default_application_configuration`,
//! `default_location_configuration` and `application_configuration`.
//! All maps preserve insertion order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use webconf_tree::{LocationMatcher, MatcherKind};

/// Option name to option entry, in insertion order.
pub type OptionMap = IndexMap<String, OptionEntry>;

/// The resolved configuration manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Process-wide options.
    pub global_configuration: OptionMap,

    /// Fallback for every application.
    pub default_application_configuration: OptionMap,

    /// Fallback for every location.
    pub default_location_configuration: OptionMap,

    /// Application group name to application container.
    pub application_configuration: IndexMap<String, ApplicationContainer>,
}

/// Settings of one application group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationContainer {
    /// Application-scoped options.
    pub options: OptionMap,

    /// This application's location fallback (server-level settings).
    pub default_location_configuration: OptionMap,

    /// Location blocks in discovery order.
    pub locations: Vec<LocationEntry>,
}

/// One location block of one virtual host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub web_server_virtual_host: VirtualHostRecord,
    pub location_matcher: LocationMatcher,
    pub options: OptionMap,
}

/// Identity of the virtual host a location belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualHostRecord {
    pub server_names: Vec<String>,
}

/// The value chain of one option at one scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub value_hierarchy: Vec<HierarchyMember>,
}

/// One contribution to an option's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyMember {
    pub source: Source,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Where a hierarchy member came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(rename = "type")]
    pub kind: SourceType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    #[serde(rename = "web-server-config")]
    WebServerConfig,
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "dynamic-default-description")]
    DynamicDefaultDescription,
}

impl Source {
    pub fn web_server_config(path: impl Into<String>, line: u64) -> Self {
        Self {
            kind: SourceType::WebServerConfig,
            path: Some(path.into()),
            line: Some(line),
        }
    }

    pub fn static_default() -> Self {
        Self {
            kind: SourceType::Default,
            path: None,
            line: None,
        }
    }

    pub fn dynamic_default() -> Self {
        Self {
            kind: SourceType::DynamicDefaultDescription,
            path: None,
            line: None,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(
            self.kind,
            SourceType::Default | SourceType::DynamicDefaultDescription
        )
    }
}

impl Manifest {
    /// An empty manifest: the four sections with empty containers.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn application(&self, group: &str) -> Option<&ApplicationContainer> {
        self.application_configuration.get(group)
    }

    /// Visit every option entry exactly once.
    pub fn for_each_entry_mut(&mut self, mut f: impl FnMut(&mut OptionEntry)) {
        let sections = [
            &mut self.global_configuration,
            &mut self.default_application_configuration,
            &mut self.default_location_configuration,
        ];
        for options in sections {
            options.values_mut().for_each(&mut f);
        }

        for app in self.application_configuration.values_mut() {
            app.options.values_mut().for_each(&mut f);
            app.default_location_configuration.values_mut().for_each(&mut f);
            for location in &mut app.locations {
                location.options.values_mut().for_each(&mut f);
            }
        }
    }

    /// Total number of option entries across all scopes.
    pub fn option_entry_count(&self) -> usize {
        let top = self.global_configuration.len()
            + self.default_application_configuration.len()
            + self.default_location_configuration.len();
        let apps: usize = self
            .application_configuration
            .values()
            .map(|app| {
                app.options.len()
                    + app.default_location_configuration.len()
                    + app.locations.iter().map(|l| l.options.len()).sum::<usize>()
            })
            .sum();
        top + apps
    }

    pub fn location_count(&self) -> usize {
        self.application_configuration
            .values()
            .map(|app| app.locations.len())
            .sum()
    }

    /// Find the entry a consumer would consult for `option` outside any
    /// location block.
    ///
    /// Without an application the top-level sections are searched in order
    /// global, default application, default location. With one, its options
    /// then its location defaults.
    pub fn lookup(&self, application: Option<&str>, option: &str) -> Option<&OptionEntry> {
        let Some(group) = application else {
            return self
                .global_configuration
                .get(option)
                .or_else(|| self.default_application_configuration.get(option))
                .or_else(|| self.default_location_configuration.get(option));
        };

        let app = self.application(group)?;
        app.options
            .get(option)
            .or_else(|| app.default_location_configuration.get(option))
    }

    /// Every location of `application` whose pattern is `pattern`, narrowed
    /// to one matcher kind when given. One pattern may be recorded for
    /// several virtual hosts and matcher kinds.
    pub fn matching_locations<'m>(
        &'m self,
        application: &str,
        pattern: &'m str,
        kind: Option<MatcherKind>,
    ) -> impl Iterator<Item = &'m LocationEntry> + 'm {
        self.application(application)
            .into_iter()
            .flat_map(|app| app.locations.iter())
            .filter(move |location| {
                location.location_matcher.value == pattern
                    && kind.map_or(true, |k| location.location_matcher.kind == k)
            })
    }
}

impl OptionEntry {
    /// The winning value: the first member's value once the hierarchy is in
    /// most-specific-first order.
    pub fn effective_value(&self) -> Option<&Value> {
        self.value_hierarchy.first().and_then(|m| m.value.as_ref())
    }

    /// Flip the order of the value hierarchy. Applying it twice restores the
    /// original order.
    pub fn reverse_hierarchy(&mut self) {
        self.value_hierarchy.reverse();
    }

    pub fn has_default(&self) -> bool {
        self.value_hierarchy.iter().any(|m| m.source.is_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_manifest_shape() {
        let manifest = Manifest::new();
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(
            json,
            json!({
                "global_configuration": {},
                "default_application_configuration": {},
                "default_location_configuration": {},
                "application_configuration": {}
            })
        );
    }

    #[test]
    fn test_hierarchy_member_serialization() {
        let member = HierarchyMember {
            source: Source::web_server_config("/etc/nginx/nginx.conf", 7),
            value: Some(json!("1")),
        };
        assert_eq!(
            serde_json::to_value(&member).unwrap(),
            json!({
                "source": {"type": "web-server-config", "path": "/etc/nginx/nginx.conf", "line": 7},
                "value": "1"
            })
        );

        let member = HierarchyMember {
            source: Source::static_default(),
            value: None,
        };
        assert_eq!(
            serde_json::to_value(&member).unwrap(),
            json!({"source": {"type": "default"}})
        );
    }

    #[test]
    fn test_effective_value_is_first_member() {
        let entry = OptionEntry {
            value_hierarchy: vec![
                HierarchyMember {
                    source: Source::web_server_config("a.conf", 1),
                    value: Some(json!(10)),
                },
                HierarchyMember {
                    source: Source::static_default(),
                    value: Some(json!(6)),
                },
            ],
        };
        assert_eq!(entry.effective_value(), Some(&json!(10)));
        assert!(entry.has_default());
    }

    #[test]
    fn test_lookup_falls_back_through_top_level_sections() {
        let mut manifest = Manifest::new();
        manifest
            .default_location_configuration
            .insert("enabled".to_string(), OptionEntry::default());
        assert!(manifest.lookup(None, "enabled").is_some());
        assert!(manifest.lookup(Some("missing"), "enabled").is_none());
    }

    #[test]
    fn test_matching_locations_by_pattern_and_kind() {
        let mut manifest = Manifest::new();
        let locations = &mut manifest
            .application_configuration
            .entry("g".to_string())
            .or_default()
            .locations;
        for (kind, pattern, host) in [
            (MatcherKind::Exact, "/app", "a.test"),
            (MatcherKind::Prefix, "/app", "a.test"),
            (MatcherKind::Prefix, "/app", "b.test"),
            (MatcherKind::Prefix, "/other", "a.test"),
        ] {
            locations.push(LocationEntry {
                web_server_virtual_host: VirtualHostRecord {
                    server_names: vec![host.to_string()],
                },
                location_matcher: LocationMatcher::new(kind, pattern),
                options: OptionMap::new(),
            });
        }

        assert_eq!(manifest.matching_locations("g", "/app", None).count(), 3);

        let prefix: Vec<_> = manifest
            .matching_locations("g", "/app", Some(MatcherKind::Prefix))
            .map(|l| l.web_server_virtual_host.server_names[0].as_str())
            .collect();
        assert_eq!(prefix, vec!["a.test", "b.test"]);

        assert_eq!(
            manifest
                .matching_locations("g", "/app", Some(MatcherKind::Regex))
                .count(),
            0
        );
        assert_eq!(manifest.matching_locations("missing", "/app", None).count(), 0);
    }
}
