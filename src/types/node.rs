//! Tree model for the bookmark forest.
//!
//! A [`Forest`] is an ordered sequence of root [`Node`]s. Nodes are shared
//! through [`NodeRef`] (`Arc<Node>`) so that a new snapshot produced by a
//! mutation can reuse every subtree it did not touch.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shared handle to an immutable node.
pub type NodeRef = Arc<Node>;

/// A bookmark or folder in the forest.
///
/// `parent_id` is `None` for nodes at root level. It mirrors the node's actual
/// position and is rewritten by every operation that relocates the node.
///
/// Equality and drop both walk the subtree with a work list, so a folder chain
/// as deep as the import ceiling allows is safe to compare and to free.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub title: String,
    pub parent_id: Option<String>,
    pub tags: BTreeSet<String>,
    pub notes: Option<String>,
    pub kind: NodeKind,
}

/// The two node variants. Leaves carry a URL, folders carry ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Bookmark { url: String },
    Folder { children: Vec<NodeRef> },
}

impl Node {
    /// Creates an empty root-level folder with a freshly generated id.
    pub fn new_folder(title: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            parent_id: None,
            tags: BTreeSet::new(),
            notes: None,
            kind: NodeKind::Folder {
                children: Vec::new(),
            },
        }
    }

    /// Creates a root-level bookmark with a freshly generated id.
    pub fn new_bookmark(title: &str, url: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            parent_id: None,
            tags: BTreeSet::new(),
            notes: None,
            kind: NodeKind::Bookmark {
                url: url.to_string(),
            },
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub fn is_bookmark(&self) -> bool {
        matches!(self.kind, NodeKind::Bookmark { .. })
    }

    /// Returns the URL of a bookmark, `None` for folders.
    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Bookmark { url } => Some(url),
            NodeKind::Folder { .. } => None,
        }
    }

    /// Returns the children of a folder, `None` for bookmarks.
    pub fn children(&self) -> Option<&[NodeRef]> {
        match &self.kind {
            NodeKind::Folder { children } => Some(children),
            NodeKind::Bookmark { .. } => None,
        }
    }

    /// True when everything but the children matches: identity, parent link,
    /// title, metadata, and the URL for bookmarks.
    pub fn same_fields(&self, other: &Node) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.parent_id == other.parent_id
            && self.tags == other.tags
            && self.notes == other.notes
            && self.url() == other.url()
            && self.is_folder() == other.is_folder()
    }

    /// Copies the node's identity and metadata onto a folder holding `children`.
    pub(crate) fn with_children(&self, children: Vec<NodeRef>) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            parent_id: self.parent_id.clone(),
            tags: self.tags.clone(),
            notes: self.notes.clone(),
            kind: NodeKind::Folder { children },
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut pending: Vec<(&Node, &Node)> = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if !a.same_fields(b) {
                return false;
            }
            if let (Some(left), Some(right)) = (a.children(), b.children()) {
                if left.len() != right.len() {
                    return false;
                }
                pending.extend(
                    left.iter()
                        .zip(right)
                        .filter(|&(x, y)| !Arc::ptr_eq(x, y))
                        .map(|(x, y)| (x.as_ref(), y.as_ref())),
                );
            }
        }
        true
    }
}

impl Eq for Node {}

impl Drop for Node {
    fn drop(&mut self) {
        let NodeKind::Folder { children } = &mut self.kind else {
            return;
        };
        let mut pending = std::mem::take(children);
        while let Some(child) = pending.pop() {
            // Shared children stay alive in another snapshot; only nodes we
            // own outright are emptied here before they are freed.
            if let Ok(mut node) = Arc::try_unwrap(child) {
                if let NodeKind::Folder { children } = &mut node.kind {
                    pending.append(children);
                }
            }
        }
    }
}

/// Ordered sequence of root nodes.
///
/// Cloning a `Forest` is cheap and keeps pointer identity, which is what
/// [`Forest::ptr_eq`] checks. Mutations that change nothing hand back such a
/// clone, so callers can detect no-ops without comparing contents.
///
/// Serializes as a flat pre-order list of node records (see
/// [`crate::types::snapshot`]), never as nested JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest(Arc<Vec<NodeRef>>);

impl Forest {
    pub fn new(nodes: Vec<NodeRef>) -> Self {
        Self(Arc::new(nodes))
    }

    pub fn nodes(&self) -> &[NodeRef] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeRef> {
        self.0.iter()
    }

    /// Every node in depth-first pre-order.
    pub fn preorder(&self) -> PreOrder<'_> {
        PreOrder {
            stack: self.0.iter().rev().collect(),
        }
    }

    /// True when both values are the same snapshot (not merely equal).
    pub fn ptr_eq(a: &Forest, b: &Forest) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl From<Vec<Node>> for Forest {
    fn from(nodes: Vec<Node>) -> Self {
        Self::new(nodes.into_iter().map(Arc::new).collect())
    }
}

/// Pre-order iterator returned by [`Forest::preorder`].
pub struct PreOrder<'a> {
    stack: Vec<&'a NodeRef>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a NodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(children) = node.children() {
            self.stack.extend(children.iter().rev());
        }
        Some(node)
    }
}

/// Node totals produced by [`crate::tree::query::count_by_type`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCounts {
    pub total: usize,
    pub folders: usize,
    pub bookmarks: usize,
}
