//! Bookmark Manager.
//!
//! Holds the single authoritative forest snapshot. Every user action is an
//! [`BookmarkAction`] run through the pure [`reduce`] function; the manager
//! validates input before building actions, swaps in the resulting snapshot,
//! and hands changed snapshots to the autosaver.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info, warn};

use crate::managers::autosave::Autosaver;
use crate::netscape::{parse_bookmarks_html, serialize_bookmarks_html, DEFAULT_MAX_ITEMS};
use crate::netscape::serializer::DEFAULT_DOCUMENT_TITLE;
use crate::tree::{self, DuplicateGroup, FilterResult, InsertPosition, NodeEdit};
use crate::types::errors::{BookmarkError, ValidationError};
use crate::types::node::{Forest, Node, NodeCounts, NodeRef};

/// A user action against the forest.
#[derive(Debug, Clone)]
pub enum BookmarkAction {
    Insert { position: InsertPosition, node: Node },
    Remove { id: String },
    Move { id: String, new_parent: Option<String> },
    Reorder { parent: Option<String>, active: String, over: String },
    Rename { id: String, title: String },
    Edit { id: String, changes: NodeEdit },
    RemoveMany { ids: HashSet<String> },
    Replace { forest: Forest },
    Clear,
}

impl BookmarkAction {
    /// Short label for logs. Actions can carry whole forests, which are too
    /// large (and too deep) to print.
    pub fn name(&self) -> &'static str {
        match self {
            BookmarkAction::Insert { .. } => "insert",
            BookmarkAction::Remove { .. } => "remove",
            BookmarkAction::Move { .. } => "move",
            BookmarkAction::Reorder { .. } => "reorder",
            BookmarkAction::Rename { .. } => "rename",
            BookmarkAction::Edit { .. } => "edit",
            BookmarkAction::RemoveMany { .. } => "remove_many",
            BookmarkAction::Replace { .. } => "replace",
            BookmarkAction::Clear => "clear",
        }
    }
}

/// Applies one action to a snapshot. Returns `forest` itself for no-ops.
pub fn reduce(forest: &Forest, action: &BookmarkAction) -> Forest {
    match action {
        BookmarkAction::Insert { position, node } => tree::insert(forest, position, node.clone()),
        BookmarkAction::Remove { id } => tree::remove(forest, id),
        BookmarkAction::Move { id, new_parent } => {
            tree::move_node(forest, id, new_parent.as_deref())
        }
        BookmarkAction::Reorder {
            parent,
            active,
            over,
        } => tree::reorder(forest, parent.as_deref(), active, over),
        BookmarkAction::Rename { id, title } => tree::rename(forest, id, title),
        BookmarkAction::Edit { id, changes } => tree::edit(forest, id, changes),
        BookmarkAction::RemoveMany { ids } => tree::remove_many(forest, ids),
        BookmarkAction::Replace { forest: next } => next.clone(),
        BookmarkAction::Clear if forest.is_empty() => forest.clone(),
        BookmarkAction::Clear => Forest::default(),
    }
}

/// Rejects empty or whitespace-only titles. Returns the trimmed title.
pub fn validate_title(title: &str) -> Result<&str, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed)
}

/// Requires an absolute URL. Returns the trimmed URL.
pub fn validate_url(raw: &str) -> Result<&str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    url::Url::parse(trimmed)
        .map_err(|e| ValidationError::InvalidUrl(format!("{}: {}", trimmed, e)))?;
    Ok(trimmed)
}

/// Tags travel as one comma-separated attribute, so a tag must be non-empty,
/// comma-free and already trimmed to come back unchanged after export.
pub fn validate_tags(tags: &BTreeSet<String>) -> Result<(), ValidationError> {
    match tags.iter().find(|t| t.is_empty() || t.contains(',') || t.trim() != t.as_str()) {
        Some(bad) => Err(ValidationError::InvalidTag(bad.clone())),
        None => Ok(()),
    }
}

/// Trait defining bookmark management operations.
pub trait BookmarkManagerTrait {
    fn add_folder(
        &mut self,
        title: &str,
        position: InsertPosition,
    ) -> Result<Option<String>, BookmarkError>;
    fn add_bookmark(
        &mut self,
        title: &str,
        url: &str,
        position: InsertPosition,
    ) -> Result<Option<String>, BookmarkError>;
    fn rename(&mut self, id: &str, title: &str) -> Result<bool, BookmarkError>;
    fn edit(&mut self, id: &str, changes: NodeEdit) -> Result<bool, BookmarkError>;
    fn delete(&mut self, id: &str) -> bool;
    fn move_node(&mut self, id: &str, new_parent: Option<&str>) -> bool;
    fn reorder(&mut self, parent: Option<&str>, active: &str, over: &str) -> bool;
    fn remove_duplicates(&mut self, ids: &HashSet<String>) -> bool;
    fn import_html(&mut self, html: &str) -> Result<NodeCounts, BookmarkError>;
    fn export_html(&self) -> String;
    fn clear(&mut self) -> bool;
}

/// Owner of the current forest snapshot.
pub struct BookmarkManager {
    forest: Forest,
    autosaver: Option<Autosaver>,
    max_import_items: usize,
    document_title: String,
}

impl Default for BookmarkManager {
    fn default() -> Self {
        Self::new(Forest::default())
    }
}

impl BookmarkManager {
    pub fn new(forest: Forest) -> Self {
        Self {
            forest,
            autosaver: None,
            max_import_items: DEFAULT_MAX_ITEMS,
            document_title: DEFAULT_DOCUMENT_TITLE.to_string(),
        }
    }

    pub fn with_import_limit(mut self, max_items: usize) -> Self {
        self.set_import_limit(max_items);
        self
    }

    pub fn with_document_title(mut self, title: &str) -> Self {
        self.set_document_title(title);
        self
    }

    pub fn set_import_limit(&mut self, max_items: usize) {
        self.max_import_items = max_items;
    }

    pub fn set_document_title(&mut self, title: &str) {
        self.document_title = title.to_string();
    }

    /// Attaches an autosaver; every later change is scheduled on it.
    pub fn attach_autosaver(&mut self, autosaver: Autosaver) {
        self.autosaver = Some(autosaver);
    }

    pub fn detach_autosaver(&mut self) -> Option<Autosaver> {
        self.autosaver.take()
    }

    pub fn autosaver(&self) -> Option<&Autosaver> {
        self.autosaver.as_ref()
    }

    /// The current snapshot.
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Applies an action. Returns `false` when it changed nothing.
    pub fn dispatch(&mut self, action: BookmarkAction) -> bool {
        let next = reduce(&self.forest, &action);
        if Forest::ptr_eq(&next, &self.forest) {
            debug!(action = action.name(), "bookmark action had no effect");
            return false;
        }
        self.forest = next;
        if let Some(autosaver) = &self.autosaver {
            autosaver.schedule(self.forest.clone());
        }
        true
    }

    fn insert_new(&mut self, node: Node, position: InsertPosition) -> Option<String> {
        let id = node.id.clone();
        self.dispatch(BookmarkAction::Insert { position, node }).then_some(id)
    }

    pub fn find(&self, id: &str) -> Option<&NodeRef> {
        tree::find_node_by_id(&self.forest, id)
    }

    pub fn stats(&self) -> NodeCounts {
        tree::count_by_type(&self.forest)
    }

    pub fn search(&self, query: &str) -> FilterResult {
        tree::filter(&self.forest, query)
    }

    pub fn duplicates(&self) -> Vec<DuplicateGroup> {
        tree::find_duplicates(&self.forest)
    }
}

impl BookmarkManagerTrait for BookmarkManager {
    /// Adds an empty folder. Returns its id, or `None` if the target was not found.
    fn add_folder(
        &mut self,
        title: &str,
        position: InsertPosition,
    ) -> Result<Option<String>, BookmarkError> {
        let title = validate_title(title)?;
        Ok(self.insert_new(Node::new_folder(title), position))
    }

    /// Adds a bookmark. Returns its id, or `None` if the target was not found.
    fn add_bookmark(
        &mut self,
        title: &str,
        url: &str,
        position: InsertPosition,
    ) -> Result<Option<String>, BookmarkError> {
        let title = validate_title(title)?;
        let url = validate_url(url)?;
        Ok(self.insert_new(Node::new_bookmark(title, url), position))
    }

    fn rename(&mut self, id: &str, title: &str) -> Result<bool, BookmarkError> {
        let title = validate_title(title)?;
        Ok(self.dispatch(BookmarkAction::Rename {
            id: id.to_string(),
            title: title.to_string(),
        }))
    }

    /// Edits title, URL, notes or tags. Title and URL are validated when present.
    fn edit(&mut self, id: &str, mut changes: NodeEdit) -> Result<bool, BookmarkError> {
        if let Some(title) = &changes.title {
            changes.title = Some(validate_title(title)?.to_string());
        }
        if let Some(url) = &changes.url {
            changes.url = Some(validate_url(url)?.to_string());
        }
        if let Some(tags) = &changes.tags {
            validate_tags(tags)?;
        }
        Ok(self.dispatch(BookmarkAction::Edit {
            id: id.to_string(),
            changes,
        }))
    }

    fn delete(&mut self, id: &str) -> bool {
        self.dispatch(BookmarkAction::Remove { id: id.to_string() })
    }

    fn move_node(&mut self, id: &str, new_parent: Option<&str>) -> bool {
        self.dispatch(BookmarkAction::Move {
            id: id.to_string(),
            new_parent: new_parent.map(str::to_string),
        })
    }

    fn reorder(&mut self, parent: Option<&str>, active: &str, over: &str) -> bool {
        self.dispatch(BookmarkAction::Reorder {
            parent: parent.map(str::to_string),
            active: active.to_string(),
            over: over.to_string(),
        })
    }

    /// Drops the given bookmarks; the caller picks which duplicates go.
    fn remove_duplicates(&mut self, ids: &HashSet<String>) -> bool {
        self.dispatch(BookmarkAction::RemoveMany { ids: ids.clone() })
    }

    /// Replaces the forest with the parsed file. On failure the current
    /// forest is left untouched.
    fn import_html(&mut self, html: &str) -> Result<NodeCounts, BookmarkError> {
        let forest = match parse_bookmarks_html(html, self.max_import_items) {
            Ok(forest) => forest,
            Err(e) => {
                warn!(error = %e, "bookmark import failed");
                return Err(e.into());
            }
        };
        let counts = tree::count_by_type(&forest);
        self.dispatch(BookmarkAction::Replace { forest });
        info!(
            folders = counts.folders,
            bookmarks = counts.bookmarks,
            "bookmarks imported"
        );
        Ok(counts)
    }

    fn export_html(&self) -> String {
        serialize_bookmarks_html(&self.forest, &self.document_title)
    }

    fn clear(&mut self) -> bool {
        self.dispatch(BookmarkAction::Clear)
    }
}
