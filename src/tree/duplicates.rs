//! URL-keyed duplicate detection.
//!
//! URLs are compared as exact strings: no trailing-slash, scheme-case or
//! query-order normalization.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::tree::query::walk;
use crate::types::node::Forest;

/// Bookmarks sharing one URL, in pre-order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub url: String,
    pub ids: Vec<String>,
}

/// Groups of bookmark ids sharing a URL, ordered by first occurrence.
/// URLs held by a single bookmark are omitted.
pub fn find_duplicates(forest: &Forest) -> Vec<DuplicateGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    walk(forest.nodes(), |node| {
        let Some(url) = node.url() else { return };
        match index.get(url) {
            Some(&slot) => groups[slot].ids.push(node.id.clone()),
            None => {
                index.insert(url, groups.len());
                groups.push(DuplicateGroup {
                    url: url.to_string(),
                    ids: vec![node.id.clone()],
                });
            }
        }
    });

    groups.retain(|group| group.ids.len() > 1);
    groups
}

/// Every id belonging to a duplicate group. The first copy is not exempted;
/// choosing what to keep is left to the caller.
pub fn duplicate_ids(forest: &Forest) -> HashSet<String> {
    find_duplicates(forest)
        .into_iter()
        .flat_map(|group| group.ids)
        .collect()
}
