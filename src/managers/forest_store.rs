//! Whole-forest persistence.
//!
//! The forest is always written and read as one JSON blob under a single
//! key. There are no partial updates. The blob is the flat record list of
//! [`crate::types::snapshot`], so any forest that can be saved can also be
//! loaded back, however deep its folders nest.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension};
use tracing::{debug, error};

use crate::database::connection::Database;
use crate::types::errors::StoreError;
use crate::types::node::Forest;

/// Key used when no setting overrides it.
pub const DEFAULT_STORAGE_KEY: &str = "bookmark-forest";

/// Trait defining the persistence collaborator.
pub trait ForestStore: Send + Sync {
    fn save(&self, forest: &Forest) -> Result<(), StoreError>;
    /// Returns an empty forest when nothing has been stored.
    fn load(&self) -> Result<Forest, StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Forest store backed by the `kv_store` SQLite table.
pub struct SqliteForestStore {
    db: Mutex<Database>,
    key: String,
}

impl SqliteForestStore {
    pub fn new(db: Database, key: &str) -> Self {
        Self {
            db: Mutex::new(db),
            key: key.to_string(),
        }
    }

    /// In-memory store under the default key.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Database::open_in_memory().map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        Ok(Self::new(db, DEFAULT_STORAGE_KEY))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn with_db<T>(
        &self,
        f: impl FnOnce(&Database) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        let db = self
            .db
            .lock()
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        f(&db).map_err(|e| StoreError::DatabaseError(e.to_string()))
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }
}

impl ForestStore for SqliteForestStore {
    fn save(&self, forest: &Forest) -> Result<(), StoreError> {
        let json = serde_json::to_string(forest)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        let now = Self::now();
        self.with_db(|db| {
            db.connection().execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![self.key, json, now],
            )
        })?;
        debug!(key = %self.key, roots = forest.len(), "forest saved");
        Ok(())
    }

    fn load(&self) -> Result<Forest, StoreError> {
        let stored: Option<String> = self.with_db(|db| {
            db.connection()
                .query_row(
                    "SELECT value FROM kv_store WHERE key = ?1",
                    params![self.key],
                    |row| row.get(0),
                )
                .optional()
        })?;

        match stored {
            Some(json) => {
                serde_json::from_str(&json)
                    .map_err(|e| StoreError::SerializationError(e.to_string()))
            }
            None => Ok(Forest::default()),
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.with_db(|db| {
            db.connection()
                .execute("DELETE FROM kv_store WHERE key = ?1", params![self.key])
        })?;
        Ok(())
    }
}

/// Loads the stored forest, falling back to an empty one on failure so a
/// broken store never blocks startup. The failure is logged.
pub fn load_or_empty(store: &dyn ForestStore) -> Forest {
    match store.load() {
        Ok(forest) => forest,
        Err(e) => {
            error!(error = %e, "failed to load bookmarks, starting empty");
            Forest::default()
        }
    }
}
