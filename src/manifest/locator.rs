//! Entry lookup and lazy creation.
//!
//! Every directive the driver records first resolves the `(scope, option)`
//! pair to an option entry, creating containers on first use.

use tracing::debug;
use webconf_tree::{LocationMatcher, MatcherKind};

use super::model::{
    ApplicationContainer, LocationEntry, Manifest, OptionEntry, OptionMap, VirtualHostRecord,
};

/// Virtual host identity as seen by the driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualHostDescriptor {
    pub server_names: Vec<String>,
}

impl VirtualHostDescriptor {
    pub fn new<I, S>(server_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            server_names: server_names.into_iter().map(Into::into).collect(),
        }
    }

    /// True when any name equals any of `names`, ignoring ASCII case.
    fn shares_name_with(&self, names: &[String]) -> bool {
        names.iter().any(|recorded| {
            self.server_names
                .iter()
                .any(|name| name.eq_ignore_ascii_case(recorded))
        })
    }
}

/// A location block as seen by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationDescriptor {
    pub kind: MatcherKind,
    pub pattern: String,
}

impl LocationDescriptor {
    pub fn new(kind: MatcherKind, pattern: impl Into<String>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
        }
    }
}

/// The scope a directive is recorded at.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    Global,
    /// An empty group means no application has been determined yet.
    Application { group: &'a str },
    /// `location: None` is a server-level setting outside any location block.
    Location {
        group: &'a str,
        virtual_host: &'a VirtualHostDescriptor,
        location: Option<&'a LocationDescriptor>,
    },
}

impl Manifest {
    /// Find or create the entry for `option` at `scope`.
    pub fn locate(&mut self, scope: &Scope<'_>, option: &str) -> &mut OptionEntry {
        match *scope {
            Scope::Global => entry_in(&mut self.global_configuration, option),
            Scope::Application { group } if group.is_empty() => {
                entry_in(&mut self.default_application_configuration, option)
            }
            Scope::Application { group } => {
                entry_in(&mut self.application_mut(group).options, option)
            }
            Scope::Location { group, .. } if group.is_empty() => {
                entry_in(&mut self.default_location_configuration, option)
            }
            Scope::Location {
                group,
                location: None,
                ..
            } => entry_in(
                &mut self.application_mut(group).default_location_configuration,
                option,
            ),
            Scope::Location {
                group,
                virtual_host,
                location: Some(location),
            } => {
                let app = self.application_mut(group);
                let index = app.location_index(virtual_host, location);
                entry_in(&mut app.locations[index].options, option)
            }
        }
    }

    fn application_mut(&mut self, group: &str) -> &mut ApplicationContainer {
        self.application_configuration
            .entry(group.to_string())
            .or_insert_with(|| {
                debug!(group, "creating application container");
                ApplicationContainer::default()
            })
    }
}

impl ApplicationContainer {
    /// Index of the first recorded location matching the descriptors.
    pub fn find_location(
        &self,
        virtual_host: &VirtualHostDescriptor,
        location: &LocationDescriptor,
    ) -> Option<usize> {
        self.locations
            .iter()
            .position(|entry| entry.matches(virtual_host, location))
    }

    fn location_index(
        &mut self,
        virtual_host: &VirtualHostDescriptor,
        location: &LocationDescriptor,
    ) -> usize {
        if let Some(index) = self.find_location(virtual_host, location) {
            return index;
        }

        debug!(
            kind = location.kind.as_str(),
            pattern = %location.pattern,
            server_names = ?virtual_host.server_names,
            "recording new location entry"
        );
        self.locations.push(LocationEntry::new(virtual_host, location));
        self.locations.len() - 1
    }
}

impl LocationEntry {
    pub fn new(virtual_host: &VirtualHostDescriptor, location: &LocationDescriptor) -> Self {
        Self {
            web_server_virtual_host: VirtualHostRecord {
                server_names: virtual_host.server_names.clone(),
            },
            location_matcher: LocationMatcher::new(location.kind, location.pattern.clone()),
            options: OptionMap::new(),
        }
    }

    /// Same matcher type, byte-equal pattern and at least one shared server
    /// name.
    pub fn matches(
        &self,
        virtual_host: &VirtualHostDescriptor,
        location: &LocationDescriptor,
    ) -> bool {
        self.location_matcher.kind == location.kind
            && self.location_matcher.value.as_bytes() == location.pattern.as_bytes()
            && virtual_host.shares_name_with(&self.web_server_virtual_host.server_names)
    }
}

fn entry_in<'m>(options: &'m mut OptionMap, option: &str) -> &'m mut OptionEntry {
    options.entry(option.to_string()).or_default()
}
