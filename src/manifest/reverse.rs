//! Hierarchy reversal.
//!
//! Directives are recorded while the driver descends the context tree, so a
//! freshly collected hierarchy runs from least to most specific. Consumers
//! read the first member as the winning value, so every hierarchy is flipped
//! once before defaults are appended.

use tracing::debug;

use super::model::{Manifest, OptionEntry};

/// Reverse every value hierarchy in the manifest.
///
/// Not idempotent: callers must run it exactly once per build, which
/// `ManifestBuilder::finish` guarantees.
pub(crate) fn reverse_value_hierarchies(manifest: &mut Manifest) -> usize {
    let mut visited = 0;
    manifest.for_each_entry_mut(|entry: &mut OptionEntry| {
        entry.reverse_hierarchy();
        visited += 1;
    });
    debug!(entries = visited, "reversed value hierarchies");
    visited
}
