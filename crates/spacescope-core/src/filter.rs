/// Search filtering over a flat hierarchy dataset.
///
/// A search keeps every record whose label or id contains the term
/// (case-insensitive) plus all of its ancestors, so the result is a set of
/// connected subtrees rather than orphaned leaves. Records whose parent did
/// not survive are re-rooted, which lets the derived dataset stand on its
/// own as a valid tree.
use crate::model::{Hierarchy, HierarchyNode};
use std::collections::BTreeSet;
use tracing::debug;

/// Result of filtering a dataset against one term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filtered {
    /// The term is empty or whitespace-only; use the original as is.
    Unchanged,
    /// Nothing matched.
    NoMatches,
    /// Matches plus their ancestors, in original order.
    Derived(Vec<HierarchyNode>),
}

/// Filter `original` by `term`.
///
/// Output order follows the original index order, so identical inputs
/// always produce identical output.
pub fn filter(original: &Hierarchy, term: &str) -> Filtered {
    let term = term.trim();
    if term.is_empty() {
        return Filtered::Unchanged;
    }
    let needle = term.to_lowercase();
    let nodes = original.nodes();

    let mut keep: BTreeSet<usize> = BTreeSet::new();
    for (i, node) in nodes.iter().enumerate() {
        if !matches_term(node, &needle) {
            continue;
        }
        // Walk up to the root. An index already in the set has its whole
        // ancestor chain in the set too, so the walk can stop there; this
        // also terminates on malformed cyclic input.
        let mut cursor = Some(i);
        while let Some(idx) = cursor {
            if !keep.insert(idx) {
                break;
            }
            let parent = &nodes[idx].parent_id;
            cursor = if parent.is_empty() {
                None
            } else {
                original.position(parent)
            };
        }
    }

    if keep.is_empty() {
        debug!("Search {term:?} matched nothing");
        return Filtered::NoMatches;
    }

    let derived: Vec<HierarchyNode> = keep
        .iter()
        .map(|&i| {
            let node = &nodes[i];
            // A self-parented record is malformed and becomes a root.
            let parent_kept = !node.is_root()
                && node.parent_id != node.id
                && original
                    .position(&node.parent_id)
                    .is_some_and(|p| keep.contains(&p));
            if parent_kept {
                node.clone()
            } else {
                node.rerooted()
            }
        })
        .collect();
    debug!("Search {term:?} kept {} of {} records", derived.len(), nodes.len());
    Filtered::Derived(derived)
}

fn matches_term(node: &HierarchyNode, needle: &str) -> bool {
    node.label.to_lowercase().contains(needle) || node.id.to_lowercase().contains(needle)
}

/// What a [`SearchView::search`] call did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Term was blank; the full dataset is shown again.
    Reset,
    /// The view now shows `n` records.
    Matched(usize),
    /// No record matched; the previous view is kept.
    NoMatches,
}

/// The original dataset plus the currently displayed derived view.
///
/// The original is kept for the lifetime of the results so clearing the
/// search restores the full view without re-fetching.
#[derive(Debug, Clone, Default)]
pub struct SearchView {
    original: Hierarchy,
    current: Option<Hierarchy>,
    term: String,
}

impl SearchView {
    pub fn new(original: Hierarchy) -> Self {
        Self {
            original,
            current: None,
            term: String::new(),
        }
    }

    pub fn original(&self) -> &Hierarchy {
        &self.original
    }

    /// The records to render right now.
    pub fn current(&self) -> &Hierarchy {
        self.current.as_ref().unwrap_or(&self.original)
    }

    /// The term that produced [`Self::current`].
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_filtered(&self) -> bool {
        self.current.is_some()
    }

    /// Apply a new search term.
    ///
    /// A term that matches nothing leaves the previous view (and term) in
    /// place: a stale chart is more useful than an empty one.
    pub fn search(&mut self, term: &str) -> SearchOutcome {
        match filter(&self.original, term) {
            Filtered::Unchanged => {
                self.reset();
                SearchOutcome::Reset
            }
            Filtered::NoMatches => SearchOutcome::NoMatches,
            Filtered::Derived(nodes) => {
                let n = nodes.len();
                self.current = Some(Hierarchy::from_nodes(nodes));
                self.term = term.trim().to_owned();
                SearchOutcome::Matched(n)
            }
        }
    }

    /// Drop any search and show the full dataset.
    pub fn reset(&mut self) {
        self.current = None;
        self.term.clear();
    }
}
