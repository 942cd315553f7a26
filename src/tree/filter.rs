//! Search filtering with ancestor retention.

use std::collections::HashSet;
use std::sync::Arc;

use crate::types::node::{Forest, Node, NodeKind, NodeRef};

/// Output of [`filter`].
#[derive(Debug, Clone, Default)]
pub struct FilterResult {
    pub nodes: Forest,
    /// Every folder kept by the filter, whether it matched itself or only
    /// holds a match somewhere below.
    pub matching_folder_ids: HashSet<String>,
}

/// Keeps nodes whose title, URL or notes contain `query` (case-insensitive),
/// plus every folder on the way down to such a node.
///
/// A blank query returns the input forest itself and no folder ids.
pub fn filter(forest: &Forest, query: &str) -> FilterResult {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return FilterResult {
            nodes: forest.clone(),
            matching_folder_ids: HashSet::new(),
        };
    }

    let mut matching_folder_ids = HashSet::new();
    let kept = filter_level(forest.nodes(), &needle, &mut matching_folder_ids);
    let nodes = if same_refs(forest.nodes(), &kept) {
        forest.clone()
    } else {
        Forest::new(kept)
    };
    FilterResult {
        nodes,
        matching_folder_ids,
    }
}

fn matches(node: &Node, needle: &str) -> bool {
    let hit = |text: &str| text.to_lowercase().contains(needle);
    hit(node.title.as_str())
        || node.url().is_some_and(hit)
        || node.notes.as_deref().is_some_and(hit)
}

fn same_refs(a: &[NodeRef], b: &[NodeRef]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
}

/// One sibling sequence being filtered. `folder` owns `nodes` and `direct`
/// records whether that folder matched on its own.
struct Level<'a> {
    folder: Option<&'a NodeRef>,
    direct: bool,
    nodes: &'a [NodeRef],
    next: usize,
    kept: Vec<NodeRef>,
}

impl<'a> Level<'a> {
    fn new(folder: Option<&'a NodeRef>, direct: bool, nodes: &'a [NodeRef]) -> Self {
        Self {
            folder,
            direct,
            nodes,
            next: 0,
            kept: Vec::new(),
        }
    }
}

fn filter_level(nodes: &[NodeRef], needle: &str, folders: &mut HashSet<String>) -> Vec<NodeRef> {
    let mut stack = vec![Level::new(None, false, nodes)];
    while let Some(top) = stack.last_mut() {
        let level = top.nodes;
        if let Some(node) = level.get(top.next) {
            top.next += 1;
            let direct = matches(node, needle);
            match &node.kind {
                NodeKind::Folder { children } => {
                    stack.push(Level::new(Some(node), direct, children))
                }
                NodeKind::Bookmark { .. } if direct => top.kept.push(Arc::clone(node)),
                NodeKind::Bookmark { .. } => {}
            }
            continue;
        }

        let Some(done) = stack.pop() else { break };
        let (Some(folder), Some(parent)) = (done.folder, stack.last_mut()) else {
            return done.kept;
        };
        if !done.direct && done.kept.is_empty() {
            continue;
        }
        folders.insert(folder.id.clone());
        if same_refs(done.nodes, &done.kept) {
            parent.kept.push(Arc::clone(folder));
        } else {
            parent.kept.push(Arc::new(folder.with_children(done.kept)));
        }
    }
    Vec::new()
}
