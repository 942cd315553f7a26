//! Read-only lookups over a forest.
//!
//! Every walk here uses an explicit stack, so deeply nested imports cannot
//! exhaust the call stack. Traversal order is depth-first, pre-order.

use crate::types::node::{Forest, NodeCounts, NodeRef};

/// Visits every node under `nodes` in pre-order.
pub fn walk<'a>(nodes: &'a [NodeRef], mut visit: impl FnMut(&'a NodeRef)) {
    let mut stack: Vec<&'a NodeRef> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        visit(node);
        if let Some(children) = node.children() {
            stack.extend(children.iter().rev());
        }
    }
}

/// Finds the node with the given id anywhere in the forest.
pub fn find_node_by_id<'a>(forest: &'a Forest, id: &str) -> Option<&'a NodeRef> {
    find_in(forest.nodes(), id)
}

fn find_in<'a>(nodes: &'a [NodeRef], id: &str) -> Option<&'a NodeRef> {
    let mut stack: Vec<&'a NodeRef> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.id == id {
            return Some(node);
        }
        if let Some(children) = node.children() {
            stack.extend(children.iter().rev());
        }
    }
    None
}

/// Counts folders and bookmarks across the whole forest.
pub fn count_by_type(forest: &Forest) -> NodeCounts {
    let mut counts = NodeCounts::default();
    walk(forest.nodes(), |node| {
        counts.total += 1;
        if node.is_folder() {
            counts.folders += 1;
        } else {
            counts.bookmarks += 1;
        }
    });
    counts
}

/// Ancestor-safety check: true when `target_id` is `node` itself or lies
/// anywhere inside its subtree. A move of `node` into such a target would
/// create a cycle.
pub fn is_self_or_descendant(node: &NodeRef, target_id: &str) -> bool {
    node.id == target_id || find_in(std::slice::from_ref(node), target_id).is_some()
}

/// Children of a folder, or the root sequence when `parent_id` is `None`.
///
/// Returns `None` if the id is unknown or names a bookmark.
pub fn children_of<'a>(forest: &'a Forest, parent_id: Option<&str>) -> Option<&'a [NodeRef]> {
    match parent_id {
        None => Some(forest.nodes()),
        Some(id) => find_node_by_id(forest, id)?.children(),
    }
}

/// Ids of the folders containing `id`, outermost first.
///
/// Root-level nodes yield an empty path; unknown ids yield `None`.
pub fn ancestors_of(forest: &Forest, id: &str) -> Option<Vec<String>> {
    let mut path: Vec<&str> = Vec::new();
    let mut stack: Vec<(&NodeRef, usize)> = forest.iter().rev().map(|n| (n, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        path.truncate(depth);
        if node.id == id {
            return Some(path.iter().map(|s| s.to_string()).collect());
        }
        if let Some(children) = node.children() {
            path.push(&node.id);
            stack.extend(children.iter().rev().map(|c| (c, depth + 1)));
        }
    }
    None
}
