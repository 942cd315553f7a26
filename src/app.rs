//! App Core.
//!
//! Wires settings, the SQLite store, the autosaver and the bookmark manager
//! together, and exposes the file import/export flows.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::database::connection::Database;
use crate::managers::autosave::Autosaver;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::managers::forest_store::{load_or_empty, ForestStore, SqliteForestStore};
use crate::platform;
use crate::services::file_io;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::{BookmarkError, SettingsError, StoreError};
use crate::types::node::NodeCounts;
use crate::types::settings::KeeperSettings;

/// Central application struct.
pub struct App {
    pub settings_engine: SettingsEngine,
    pub store: Arc<SqliteForestStore>,
    pub bookmarks: BookmarkManager,
}

impl App {
    /// Loads settings (defaults when missing), opens the database in the
    /// platform data directory and restores the last saved forest.
    pub fn new(settings_path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings_engine = SettingsEngine::new(settings_path);
        let settings = settings_engine.load()?;
        info!(path = settings_engine.get_config_path(), "settings ready");

        let data_dir = platform::get_data_dir();
        std::fs::create_dir_all(&data_dir)?;
        let db = Database::open(data_dir.join(&settings.persistence.database_file))?;

        Ok(Self::with_database(settings_engine, db))
    }

    /// Builds the app around an already opened database.
    pub fn with_database(settings_engine: SettingsEngine, db: Database) -> Self {
        let settings = settings_engine.get_settings().clone();
        let store = Arc::new(SqliteForestStore::new(db, &settings.persistence.storage_key));
        let forest = load_or_empty(store.as_ref());
        let bookmarks = BookmarkManager::new(forest)
            .with_import_limit(settings.import.max_items)
            .with_document_title(&settings.export.document_title);

        Self {
            settings_engine,
            store,
            bookmarks,
        }
    }

    pub fn settings(&self) -> &KeeperSettings {
        self.settings_engine.get_settings()
    }

    /// Changes one setting by dot path and saves it. Import and export
    /// settings apply immediately; persistence settings apply from the next
    /// start.
    pub fn update_setting(
        &mut self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), SettingsError> {
        self.settings_engine.set_value(key, value)?;
        self.apply_settings();
        Ok(())
    }

    /// Restores and saves default settings.
    pub fn reset_settings(&mut self) -> Result<(), SettingsError> {
        self.settings_engine.reset()?;
        self.apply_settings();
        Ok(())
    }

    fn apply_settings(&mut self) {
        let settings = self.settings_engine.get_settings();
        self.bookmarks.set_import_limit(settings.import.max_items);
        self.bookmarks.set_document_title(&settings.export.document_title);
    }

    /// Starts debounced saving. Must be called from within a tokio runtime.
    pub fn start_autosave(&mut self) {
        let delay = Duration::from_millis(self.settings().persistence.autosave_debounce_ms);
        let store: Arc<dyn ForestStore> = self.store.clone();
        self.bookmarks.attach_autosaver(Autosaver::spawn(store, delay));
    }

    pub async fn import_file<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<NodeCounts, BookmarkError> {
        let html = file_io::read_import_file(path).await?;
        self.bookmarks.import_html(&html)
    }

    pub async fn export_to<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf, std::io::Error> {
        let html = self.bookmarks.export_html();
        file_io::write_export_file(dir, &self.settings().export.app_name, &html).await
    }

    /// Flushes pending changes and stops the autosaver.
    pub async fn shutdown(&mut self) -> Result<(), StoreError> {
        match self.bookmarks.detach_autosaver() {
            Some(autosaver) => autosaver.shutdown().await,
            None => {
                info!("no autosaver running, saving directly");
                self.store.save(self.bookmarks.forest())
            }
        }
    }
}
