//! Configuration manifest.
//!
//! A manifest records, for every recognized option at every scope it was
//! seen in, the full chain of contributing values with their provenance.
//! Scopes nest as global, application, location. After finalization each
//! hierarchy runs from most to least specific and ends in the option's
//! default.
//!
//! Build one with [`ManifestBuilder`]: record explicit settings while
//! walking the configuration, then call [`ManifestBuilder::finish`].

mod builder;
mod defaults;
mod error;
mod inherit;
mod locator;
mod model;
mod output;
mod provenance;
mod reverse;

pub use builder::ManifestBuilder;
pub use error::ManifestError;
pub use locator::{LocationDescriptor, Scope, VirtualHostDescriptor};
pub use model::{
    ApplicationContainer, HierarchyMember, LocationEntry, Manifest, OptionEntry, OptionMap,
    Source, SourceType, VirtualHostRecord,
};
