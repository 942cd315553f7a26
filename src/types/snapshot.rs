//! Flat JSON form of a [`Forest`].
//!
//! A snapshot is the forest's nodes in depth-first pre-order, one record per
//! node, each naming its parent through `parentId`. Nothing nests, so the
//! document is as shallow at a depth of 10 000 folders as at one, and reading
//! it back never hits `serde_json`'s recursion limit.
//!
//! ```json
//! [
//!   {"id": "f1", "title": "Dev", "parentId": null, "type": "folder"},
//!   {"id": "b1", "title": "Rust", "parentId": "f1", "type": "bookmark",
//!    "url": "https://rust-lang.org", "tags": ["lang"]}
//! ]
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::node::{Forest, Node, NodeKind, NodeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Bookmark,
    Folder,
}

/// One node of a snapshot, without its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,
    pub title: String,
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "type")]
    pub kind: RecordType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            title: node.title.clone(),
            parent_id: node.parent_id.clone(),
            tags: node.tags.clone(),
            notes: node.notes.clone(),
            kind: if node.is_folder() {
                RecordType::Folder
            } else {
                RecordType::Bookmark
            },
            url: node.url().map(str::to_string),
        }
    }
}

impl NodeRecord {
    fn into_node(self) -> Result<Node, String> {
        let kind = match (self.kind, self.url) {
            (RecordType::Folder, _) => NodeKind::Folder {
                children: Vec::new(),
            },
            (RecordType::Bookmark, Some(url)) => NodeKind::Bookmark { url },
            (RecordType::Bookmark, None) => return Err(format!("bookmark {} has no url", self.id)),
        };
        Ok(Node {
            id: self.id,
            title: self.title,
            parent_id: self.parent_id,
            tags: self.tags,
            notes: self.notes,
            kind,
        })
    }
}

/// Records for every node of `forest`, parents before their children.
pub fn to_records(forest: &Forest) -> Vec<NodeRecord> {
    forest.preorder().map(|node| NodeRecord::from(node.as_ref())).collect()
}

/// A folder whose children are still arriving.
struct OpenFolder {
    folder: Node,
    children: Vec<NodeRef>,
}

fn close_top(open: &mut Vec<OpenFolder>, roots: &mut Vec<NodeRef>) {
    if let Some(OpenFolder { mut folder, children }) = open.pop() {
        folder.kind = NodeKind::Folder { children };
        attach(open, roots, Arc::new(folder));
    }
}

fn attach(open: &mut [OpenFolder], roots: &mut Vec<NodeRef>, node: NodeRef) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Rebuilds a forest from pre-order records.
///
/// Each record's parent must be a folder that is still open at that point,
/// i.e. one of the folders on the path to the previous record.
pub fn from_records(records: Vec<NodeRecord>) -> Result<Forest, String> {
    let mut roots: Vec<NodeRef> = Vec::new();
    let mut open: Vec<OpenFolder> = Vec::new();

    for record in records {
        match record.parent_id.as_deref() {
            None => {
                while !open.is_empty() {
                    close_top(&mut open, &mut roots);
                }
            }
            Some(parent) => {
                if !open.iter().any(|f| f.folder.id == parent) {
                    return Err(format!("record {} names unknown parent {}", record.id, parent));
                }
                while open.last().is_some_and(|f| f.folder.id != parent) {
                    close_top(&mut open, &mut roots);
                }
            }
        }

        let node = record.into_node()?;
        if node.is_folder() {
            open.push(OpenFolder {
                folder: node,
                children: Vec::new(),
            });
        } else {
            attach(&mut open, &mut roots, Arc::new(node));
        }
    }

    while !open.is_empty() {
        close_top(&mut open, &mut roots);
    }
    Ok(Forest::new(roots))
}

impl Serialize for Forest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.preorder().map(|node| NodeRecord::from(node.as_ref())))
    }
}

impl<'de> Deserialize<'de> for Forest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = Vec::<NodeRecord>::deserialize(deserializer)?;
        from_records(records).map_err(D::Error::custom)
    }
}
