/// Data model for the SpaceScope scan results.
///
/// Re-exports the flat hierarchy dataset, its record type, and size formatting.
pub mod hierarchy;
pub mod hierarchy_node;
pub mod size;

pub use hierarchy::Hierarchy;
pub use hierarchy_node::HierarchyNode;
pub use size::format_size;
