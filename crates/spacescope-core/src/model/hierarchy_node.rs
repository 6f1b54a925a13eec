/// A single record of a flat hierarchy dataset.
///
/// The tree is encoded by parent-id reference instead of nesting, which is
/// the shape the chart renderer consumes and the shape the search filter
/// operates on. An empty `parent_id` marks a root.
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// Unique within one dataset. Built from the path of names from the root.
    pub id: CompactString,
    /// Display name (file or directory name only).
    pub label: CompactString,
    /// Id of the parent record, or empty for a root.
    #[serde(rename = "parent")]
    pub parent_id: CompactString,
    /// Size in bytes. For directories this is the aggregated size.
    pub value: u64,
}

impl HierarchyNode {
    pub fn new(
        id: impl Into<CompactString>,
        label: impl Into<CompactString>,
        parent_id: impl Into<CompactString>,
        value: u64,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            parent_id: parent_id.into(),
            value,
        }
    }

    /// A root record (empty parent marker).
    pub fn root(id: impl Into<CompactString>, label: impl Into<CompactString>, value: u64) -> Self {
        Self::new(id, label, CompactString::default(), value)
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_empty()
    }

    /// Same record with the parent marker cleared.
    pub fn rerooted(&self) -> Self {
        Self {
            parent_id: CompactString::default(),
            ..self.clone()
        }
    }
}
