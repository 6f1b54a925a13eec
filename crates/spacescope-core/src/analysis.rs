/// Post-scan summary — totals plus the largest directories and files.
///
/// Computed from the full nested result (not the capped flat dataset) so
/// the numbers reflect the whole scan.
use crate::protocol::RemoteNode;

/// One entry of a "largest items" list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LargestItem {
    pub name: String,
    pub path: String,
    pub size: u64,
    /// Zero for files.
    pub file_count: u64,
    pub dir_count: u64,
}

impl LargestItem {
    fn from_node(node: &RemoteNode) -> Self {
        Self {
            name: node.name.clone(),
            path: node.path.clone(),
            size: node.size,
            file_count: node.file_count,
            dir_count: node.dir_count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub total_size: u64,
    pub file_count: u64,
    pub dir_count: u64,
    /// Largest directories first, including the scan root.
    pub top_directories: Vec<LargestItem>,
    /// Largest files first.
    pub top_files: Vec<LargestItem>,
}

impl ScanSummary {
    /// Summarise `root`, keeping at most `n` entries per list.
    pub fn from_remote(root: &RemoteNode, n: usize) -> Self {
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        collect(root, &mut dirs, &mut files);

        Self {
            total_size: root.size,
            file_count: root.file_count,
            dir_count: root.dir_count,
            top_directories: largest(dirs, n),
            top_files: largest(files, n),
        }
    }
}

/// Depth-first walk with an explicit stack. Summary buckets are skipped.
fn collect<'a>(root: &'a RemoteNode, dirs: &mut Vec<&'a RemoteNode>, files: &mut Vec<&'a RemoteNode>) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_summary {
            continue;
        }
        if node.is_file {
            files.push(node);
        } else {
            if !node.path.is_empty() && node.size > 0 {
                dirs.push(node);
            }
            stack.extend(node.children.iter().rev());
        }
    }
}

fn largest(mut nodes: Vec<&RemoteNode>, n: usize) -> Vec<LargestItem> {
    nodes.sort_by(|a, b| b.size.cmp(&a.size));
    nodes.into_iter().take(n).map(LargestItem::from_node).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, size: u64, is_file: bool, children: Vec<RemoteNode>) -> RemoteNode {
        RemoteNode {
            name: name.into(),
            path: format!("/scan/{name}"),
            size,
            children,
            file_count: if is_file { 1 } else { 0 },
            is_file,
            ..Default::default()
        }
    }

    fn sample() -> RemoteNode {
        let mut root = node(
            "scan",
            1_000,
            false,
            vec![
                node("big.iso", 600, true, vec![]),
                node("photos", 300, false, vec![node("a.jpg", 200, true, vec![]), node("b.jpg", 100, true, vec![])]),
                node("empty", 0, false, vec![]),
                RemoteNode {
                    name: "... 4 other items".into(),
                    size: 100,
                    is_summary: true,
                    ..Default::default()
                },
            ],
        );
        root.file_count = 3;
        root.dir_count = 2;
        root
    }

    #[test]
    fn totals_come_from_root() {
        let summary = ScanSummary::from_remote(&sample(), 10);
        assert_eq!(summary.total_size, 1_000);
        assert_eq!(summary.file_count, 3);
        assert_eq!(summary.dir_count, 2);
    }

    #[test]
    fn largest_lists_are_sorted_and_skip_noise() {
        let summary = ScanSummary::from_remote(&sample(), 10);
        let dirs: Vec<&str> = summary.top_directories.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(dirs, ["scan", "photos"]);
        let files: Vec<&str> = summary.top_files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(files, ["big.iso", "a.jpg", "b.jpg"]);
    }

    #[test]
    fn lists_are_truncated() {
        let summary = ScanSummary::from_remote(&sample(), 1);
        assert_eq!(summary.top_files.len(), 1);
        assert_eq!(summary.top_files[0].size, 600);
    }
}
