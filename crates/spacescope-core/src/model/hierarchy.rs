/// Flat hierarchy dataset with an id → index lookup.
///
/// Records live in a single `Vec<HierarchyNode>` in emission order (every
/// parent precedes its children when built from a scan result). The dataset
/// is immutable once built; search views derive new datasets from it.
use super::hierarchy_node::HierarchyNode;
use crate::config::FlattenLimits;
use crate::protocol::RemoteNode;
use compact_str::{format_compact, CompactString};
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    nodes: Vec<HierarchyNode>,
    /// First occurrence of each id.
    index: HashMap<CompactString, usize>,
}

impl PartialEq for Hierarchy {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl Hierarchy {
    /// Wrap an existing flat dataset.
    pub fn from_nodes(nodes: Vec<HierarchyNode>) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            index.entry(node.id.clone()).or_insert(i);
        }
        Self { nodes, index }
    }

    /// Flatten the nested scan result, applying `limits`.
    ///
    /// Children are visited largest first so that the node cap drops the
    /// least significant entries. Ids are the `/`-joined chain of names from
    /// the root; a colliding id gets a `#n` suffix so ids stay unique.
    pub fn from_remote(root: &RemoteNode, limits: &FlattenLimits) -> Self {
        let mut builder = Flattener {
            limits,
            nodes: Vec::new(),
            seen: HashSet::new(),
        };
        builder.visit(root, "", 0);
        debug!("Flattened scan result into {} records", builder.nodes.len());
        Self::from_nodes(builder.nodes)
    }

    #[inline]
    pub fn nodes(&self) -> &[HierarchyNode] {
        &self.nodes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Position of the record with this id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&HierarchyNode> {
        self.position(id).map(|i| &self.nodes[i])
    }

    /// Records with an empty parent marker.
    pub fn roots(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.nodes.iter().filter(|n| n.is_root())
    }

    /// Direct children of `id`, in dataset order.
    pub fn children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a HierarchyNode> + 'a {
        self.nodes.iter().filter(move |n| n.parent_id == id)
    }

    /// Sum of root values.
    pub fn total_value(&self) -> u64 {
        self.roots().map(|n| n.value).sum()
    }

    /// Check the tree invariants and describe every violation found.
    ///
    /// A valid dataset has unique ids, no self-referencing record, and every
    /// non-empty parent id resolves to a record in the dataset.
    pub fn violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.index.len() != self.nodes.len() {
            problems.push(format!(
                "{} duplicate id(s)",
                self.nodes.len() - self.index.len()
            ));
        }
        for node in &self.nodes {
            if node.is_root() {
                continue;
            }
            if node.parent_id == node.id {
                problems.push(format!("{} references itself", node.id));
            } else if !self.index.contains_key(node.parent_id.as_str()) {
                problems.push(format!("{} has missing parent {}", node.id, node.parent_id));
            }
        }
        problems
    }

    pub fn is_valid(&self) -> bool {
        self.violations().is_empty()
    }
}

struct Flattener<'a> {
    limits: &'a FlattenLimits,
    nodes: Vec<HierarchyNode>,
    seen: HashSet<CompactString>,
}

impl Flattener<'_> {
    fn visit(&mut self, node: &RemoteNode, parent_id: &str, depth: usize) {
        if self.nodes.len() >= self.limits.max_nodes || depth > self.limits.max_depth {
            return;
        }

        let base: CompactString = if parent_id.is_empty() {
            node.name.as_str().into()
        } else {
            format_compact!("{parent_id}/{}", node.name)
        };
        let mut id = base.clone();
        let mut suffix = 1;
        while self.seen.contains(&id) {
            suffix += 1;
            id = format_compact!("{base}#{suffix}");
        }
        self.seen.insert(id.clone());

        self.nodes.push(HierarchyNode::new(
            id.clone(),
            node.name.as_str(),
            parent_id,
            node.size,
        ));

        let mut children: Vec<&RemoteNode> = node.children.iter().collect();
        children.sort_by(|a, b| b.size.cmp(&a.size));
        for child in children.into_iter().take(self.limits.children_at(depth)) {
            if self.nodes.len() >= self.limits.max_nodes {
                break;
            }
            self.visit(child, &id, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(name: &str, size: u64, children: Vec<RemoteNode>) -> RemoteNode {
        RemoteNode {
            name: name.into(),
            size,
            children,
            ..Default::default()
        }
    }

    fn file(name: &str, size: u64) -> RemoteNode {
        RemoteNode {
            name: name.into(),
            size,
            is_file: true,
            file_count: 1,
            ..Default::default()
        }
    }

    #[test]
    fn flattening_builds_path_ids_largest_first() {
        let root = dir(
            "alex",
            600,
            vec![
                file("small.txt", 100),
                dir("Music", 500, vec![file("song.mp3", 500)]),
            ],
        );
        let tree = Hierarchy::from_remote(&root, &FlattenLimits::default());

        let ids: Vec<&str> = tree.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["alex", "alex/Music", "alex/Music/song.mp3", "alex/small.txt"]);
        assert!(tree.nodes()[0].is_root());
        assert_eq!(tree.get("alex/Music/song.mp3").unwrap().parent_id, "alex/Music");
        assert_eq!(tree.total_value(), 600);
        assert!(tree.is_valid());
    }

    #[test]
    fn node_cap_is_respected() {
        let children = (0..50).map(|i| file(&format!("f{i}"), i)).collect();
        let root = dir("root", 1_000, children);
        let limits = FlattenLimits {
            max_nodes: 10,
            ..FlattenLimits::default()
        };
        let tree = Hierarchy::from_remote(&root, &limits);
        assert_eq!(tree.len(), 10);
        // Largest children survive the cap.
        assert_eq!(tree.nodes()[1].label, "f49");
        assert!(tree.is_valid());
    }

    #[test]
    fn fan_out_limited_per_depth() {
        let children = (0..30).map(|i| file(&format!("f{i}"), i)).collect();
        let root = dir("root", 1_000, children);
        let tree = Hierarchy::from_remote(&root, &FlattenLimits::default());
        // Root + 20 children at depth 0.
        assert_eq!(tree.len(), 21);
    }

    #[test]
    fn depth_limit_drops_deep_nodes() {
        let mut node = file("leaf", 1);
        for i in (0..12).rev() {
            node = dir(&format!("d{i}"), 1, vec![node]);
        }
        let tree = Hierarchy::from_remote(&node, &FlattenLimits::default());
        // Depths 0..=8 are emitted.
        assert_eq!(tree.len(), 9);
    }

    #[test]
    fn colliding_ids_get_suffix() {
        let root = dir("root", 3, vec![file("dup", 2), file("dup", 1)]);
        let tree = Hierarchy::from_remote(&root, &FlattenLimits::unlimited());
        assert!(tree.get("root/dup").is_some());
        assert!(tree.get("root/dup#2").is_some());
        assert!(tree.is_valid());
    }

    #[test]
    fn violations_report_missing_parent_and_self_reference() {
        let tree = Hierarchy::from_nodes(vec![
            HierarchyNode::root("r", "r", 10),
            HierarchyNode::new("a", "a", "ghost", 1),
            HierarchyNode::new("b", "b", "b", 1),
        ]);
        let problems = tree.violations();
        assert_eq!(problems.len(), 2);
        assert!(!tree.is_valid());
    }

    #[test]
    fn children_in_dataset_order() {
        let tree = Hierarchy::from_nodes(vec![
            HierarchyNode::root("root", "root", 100),
            HierarchyNode::new("a", "Apps", "root", 60),
            HierarchyNode::new("b", "Books", "root", 40),
        ]);
        let kids: Vec<&str> = tree.children("root").map(|n| n.id.as_str()).collect();
        assert_eq!(kids, ["a", "b"]);
        assert_eq!(tree.position("b"), Some(2));
    }
}
