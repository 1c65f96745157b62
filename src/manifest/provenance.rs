//! Recording hierarchy members.
//!
//! Members are appended in the order they are seen; nothing here reorders
//! them.

use serde_json::Value;

use super::model::{HierarchyMember, OptionEntry, Source};

impl OptionEntry {
    /// Append a member sourced from a configuration file. The caller sets
    /// the value on the returned member.
    pub fn record_explicit(&mut self, path: &str, line: u64) -> &mut HierarchyMember {
        self.push(HierarchyMember {
            source: Source::web_server_config(path, line),
            value: None,
        })
    }

    /// Append a member carrying a default known at configuration time.
    pub fn record_static_default(&mut self, value: Value) -> &mut HierarchyMember {
        self.push(HierarchyMember {
            source: Source::static_default(),
            value: Some(value),
        })
    }

    /// Append a member describing a default only known at runtime.
    pub fn record_dynamic_default(
        &mut self,
        description: impl Into<String>,
    ) -> &mut HierarchyMember {
        self.push(HierarchyMember {
            source: Source::dynamic_default(),
            value: Some(Value::String(description.into())),
        })
    }

    fn push(&mut self, member: HierarchyMember) -> &mut HierarchyMember {
        self.value_hierarchy.push(member);
        let last = self.value_hierarchy.len() - 1;
        &mut self.value_hierarchy[last]
    }
}
