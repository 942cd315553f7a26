//! Bookmark tree engine.
//!
//! `query`, `filter` and `duplicates` only read; `mutation` is the sole
//! producer of new forest snapshots.

pub mod duplicates;
pub mod filter;
pub mod mutation;
pub mod query;

pub use duplicates::{duplicate_ids, find_duplicates, DuplicateGroup};
pub use filter::{filter, FilterResult};
pub use mutation::{
    edit, insert, move_node, remove, remove_many, rename, reorder, InsertPosition, NodeEdit,
};
pub use query::{ancestors_of, children_of, count_by_type, find_node_by_id, is_self_or_descendant};
