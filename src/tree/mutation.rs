//! Pure mutations producing new forest snapshots.
//!
//! Every function takes the current forest and returns the next one. Only the
//! nodes on the path from the root to the change are rebuilt; every other
//! subtree is carried over as the same `Arc`. When nothing changes (unknown
//! id, rejected move, ...) the input forest itself is returned, so
//! `Forest::ptr_eq(&before, &after)` tells the caller the call was a no-op.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::tree::query::{find_node_by_id, is_self_or_descendant};
use crate::types::node::{Forest, Node, NodeKind, NodeRef};

/// Where [`insert`] places a new node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertPosition {
    /// Prepend to the root sequence.
    Root,
    /// Append to the children of the named folder.
    Inside(String),
    /// Immediately before the named node, at its level.
    Before(String),
    /// Immediately after the named node, at its level.
    After(String),
}

/// Field replacements applied by [`edit`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeEdit {
    pub title: Option<String>,
    /// Ignored for folders.
    pub url: Option<String>,
    /// `Some(None)` clears the notes.
    pub notes: Option<Option<String>>,
    pub tags: Option<BTreeSet<String>>,
}

/// Position of a depth-first walk over sibling sequences. `owner` is the
/// folder holding `nodes` (`None` for the root sequence) and `next` the index
/// of the next child to descend into.
struct Cursor<'a> {
    owner: Option<&'a NodeRef>,
    nodes: &'a [NodeRef],
    next: usize,
}

/// Finds the first sibling sequence `edit` accepts, depth-first, and rebuilds
/// the path above it. `edit` receives the id of the folder owning the
/// sequence (`None` at root level).
fn rewrite_level<F>(roots: &[NodeRef], edit: &mut F) -> Option<Vec<NodeRef>>
where
    F: FnMut(Option<&str>, &[NodeRef]) -> Option<Vec<NodeRef>>,
{
    if let Some(next) = edit(None, roots) {
        return Some(next);
    }
    let mut path = vec![Cursor {
        owner: None,
        nodes: roots,
        next: 0,
    }];

    while let Some(top) = path.last_mut() {
        let level = top.nodes;
        let Some(node) = level.get(top.next) else {
            path.pop();
            continue;
        };
        top.next += 1;
        let Some(children) = node.children() else {
            continue;
        };
        let Some(mut rebuilt) = edit(Some(&node.id), children) else {
            path.push(Cursor {
                owner: Some(node),
                nodes: children,
                next: 0,
            });
            continue;
        };

        // Replace each folder on the way back up with a copy holding the
        // rebuilt level below it.
        let mut changed = node;
        while let Some(cursor) = path.pop() {
            let mut level = cursor.nodes.to_vec();
            level[cursor.next - 1] = Arc::new(changed.with_children(rebuilt));
            rebuilt = level;
            match cursor.owner {
                Some(owner) => changed = owner,
                None => break,
            }
        }
        return Some(rebuilt);
    }
    None
}

fn apply<F>(forest: &Forest, mut edit: F) -> Forest
where
    F: FnMut(Option<&str>, &[NodeRef]) -> Option<Vec<NodeRef>>,
{
    match rewrite_level(forest.nodes(), &mut edit) {
        Some(nodes) => Forest::new(nodes),
        None => forest.clone(),
    }
}

fn position_of(nodes: &[NodeRef], id: &str) -> Option<usize> {
    nodes.iter().position(|n| n.id == id)
}

/// Deletes the node (and its subtree) wherever it occurs.
pub fn remove(forest: &Forest, id: &str) -> Forest {
    apply(forest, |_, nodes| {
        let idx = position_of(nodes, id)?;
        let mut next = nodes.to_vec();
        next.remove(idx);
        Some(next)
    })
}

/// Inserts `node` at `position`, setting its `parent_id` to the resolved parent.
///
/// `Inside` a bookmark or relative to an unknown id is a no-op.
pub fn insert(forest: &Forest, position: &InsertPosition, mut node: Node) -> Forest {
    match position {
        InsertPosition::Root => {
            node.parent_id = None;
            let mut next = Vec::with_capacity(forest.len() + 1);
            next.push(Arc::new(node));
            next.extend(forest.iter().cloned());
            Forest::new(next)
        }
        InsertPosition::Inside(target) => {
            let mut node = Some(node);
            apply(forest, |_, nodes| {
                let idx = position_of(nodes, target)?;
                let folder = &nodes[idx];
                let children = folder.children()?;
                let mut child = node.take()?;
                child.parent_id = Some(folder.id.clone());
                let mut new_children = children.to_vec();
                new_children.push(Arc::new(child));
                let mut next = nodes.to_vec();
                next[idx] = Arc::new(folder.with_children(new_children));
                Some(next)
            })
        }
        InsertPosition::Before(target) | InsertPosition::After(target) => {
            let offset = usize::from(matches!(position, InsertPosition::After(_)));
            let mut node = Some(node);
            apply(forest, |parent, nodes| {
                let idx = position_of(nodes, target)?;
                let mut sibling = node.take()?;
                sibling.parent_id = parent.map(str::to_string);
                let mut next = nodes.to_vec();
                next.insert(idx + offset, Arc::new(sibling));
                Some(next)
            })
        }
    }
}

/// Moves a node into `new_parent` (appended) or to the front of the root
/// sequence when `new_parent` is `None`.
///
/// Rejected, returning the input forest, when the node is unknown, the target
/// is not an existing folder, or the target is the node itself or one of its
/// descendants.
pub fn move_node(forest: &Forest, node_id: &str, new_parent: Option<&str>) -> Forest {
    let Some(node) = find_node_by_id(forest, node_id) else {
        debug!(node_id, "move ignored: node not found");
        return forest.clone();
    };

    if let Some(target) = new_parent {
        if is_self_or_descendant(node, target) {
            debug!(node_id, target, "move rejected: target inside moved node");
            return forest.clone();
        }
        match find_node_by_id(forest, target) {
            Some(folder) if folder.is_folder() => {}
            _ => {
                debug!(node_id, target, "move ignored: target is not a folder");
                return forest.clone();
            }
        }
    }

    let moved = Node::clone(node);
    let detached = remove(forest, node_id);
    match new_parent {
        None => insert(&detached, &InsertPosition::Root, moved),
        Some(target) => insert(&detached, &InsertPosition::Inside(target.to_string()), moved),
    }
}

/// Array move within one sibling sequence: `active` is taken out and put at
/// the index `over` occupied, shifting the elements in between by one.
fn move_within(nodes: &[NodeRef], active: &str, over: &str) -> Option<Vec<NodeRef>> {
    let from = position_of(nodes, active)?;
    let to = position_of(nodes, over)?;
    let mut next = nodes.to_vec();
    let item = next.remove(from);
    next.insert(to, item);
    Some(next)
}

/// Reorders siblings under `parent_id` (`None` for the root sequence).
///
/// Both ids must be direct children of that parent; otherwise, or when
/// `active_id == over_id`, the input forest is returned.
pub fn reorder(forest: &Forest, parent_id: Option<&str>, active_id: &str, over_id: &str) -> Forest {
    if active_id == over_id {
        return forest.clone();
    }
    match parent_id {
        None => match move_within(forest.nodes(), active_id, over_id) {
            Some(nodes) => Forest::new(nodes),
            None => forest.clone(),
        },
        Some(folder_id) => apply(forest, |_, nodes| {
            let idx = position_of(nodes, folder_id)?;
            let folder = &nodes[idx];
            let children = move_within(folder.children()?, active_id, over_id)?;
            let mut next = nodes.to_vec();
            next[idx] = Arc::new(folder.with_children(children));
            Some(next)
        }),
    }
}

/// Replaces the node with `id` by `change(node)`. A change that leaves every
/// field as it was is treated as a no-op. `change` only touches the node's own
/// fields, so the children are the same `Arc`s and need no comparison.
fn replace_node<F>(forest: &Forest, id: &str, mut change: F) -> Forest
where
    F: FnMut(&Node) -> Node,
{
    apply(forest, |_, nodes| {
        let idx = position_of(nodes, id)?;
        let updated = change(&nodes[idx]);
        if updated.same_fields(&nodes[idx]) {
            return None;
        }
        let mut next = nodes.to_vec();
        next[idx] = Arc::new(updated);
        Some(next)
    })
}

/// Changes only the title of the node with `id`.
pub fn rename(forest: &Forest, id: &str, new_title: &str) -> Forest {
    replace_node(forest, id, |node| {
        let mut updated = node.clone();
        updated.title = new_title.to_string();
        updated
    })
}

/// Applies a [`NodeEdit`] to the node with `id`.
pub fn edit(forest: &Forest, id: &str, changes: &NodeEdit) -> Forest {
    replace_node(forest, id, |node| {
        let mut updated = node.clone();
        if let Some(title) = &changes.title {
            updated.title = title.clone();
        }
        if let (Some(url), NodeKind::Bookmark { url: current }) =
            (&changes.url, &mut updated.kind)
        {
            *current = url.clone();
        }
        if let Some(notes) = &changes.notes {
            updated.notes = notes.clone();
        }
        if let Some(tags) = &changes.tags {
            updated.tags = tags.clone();
        }
        updated
    })
}

/// Drops every bookmark whose id is in `ids`, at every level. Folders are
/// never removed by this path.
pub fn remove_many(forest: &Forest, ids: &HashSet<String>) -> Forest {
    if ids.is_empty() {
        return forest.clone();
    }
    match retain_level(forest.nodes(), ids) {
        Some(nodes) => Forest::new(nodes),
        None => forest.clone(),
    }
}

/// One sibling sequence being filtered by [`retain_level`].
struct Retained<'a> {
    folder: Option<&'a NodeRef>,
    nodes: &'a [NodeRef],
    next: usize,
    kept: Vec<NodeRef>,
    changed: bool,
}

impl<'a> Retained<'a> {
    fn new(folder: Option<&'a NodeRef>, nodes: &'a [NodeRef]) -> Self {
        Self {
            folder,
            nodes,
            next: 0,
            kept: Vec::with_capacity(nodes.len()),
            changed: false,
        }
    }
}

/// Post-order rebuild of `nodes` without the bookmarks in `ids`. Returns
/// `None` when nothing was dropped anywhere below.
fn retain_level(nodes: &[NodeRef], ids: &HashSet<String>) -> Option<Vec<NodeRef>> {
    let mut stack = vec![Retained::new(None, nodes)];
    loop {
        let top = stack.last_mut()?;
        let level = top.nodes;
        if let Some(node) = level.get(top.next) {
            top.next += 1;
            match &node.kind {
                NodeKind::Bookmark { .. } if ids.contains(&node.id) => top.changed = true,
                NodeKind::Bookmark { .. } => top.kept.push(Arc::clone(node)),
                NodeKind::Folder { children } => stack.push(Retained::new(Some(node), children)),
            }
            continue;
        }

        let done = stack.pop()?;
        let result = done.changed.then_some(done.kept);
        let (Some(folder), Some(parent)) = (done.folder, stack.last_mut()) else {
            return result;
        };
        match result {
            Some(kept) => {
                parent.changed = true;
                parent.kept.push(Arc::new(folder.with_children(kept)));
            }
            None => parent.kept.push(Arc::clone(folder)),
        }
    }
}
