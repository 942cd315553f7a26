use serde::{Deserialize, Serialize};

/// Top-level application settings container.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KeeperSettings {
    pub import: ImportSettings,
    pub persistence: PersistenceSettings,
    pub export: ExportSettings,
}

/// Largest accepted `import.max_items`.
pub const MAX_IMPORT_ITEMS: usize = 1_000_000;
/// Largest accepted `persistence.autosave_debounce_ms` (one minute).
pub const MAX_AUTOSAVE_DEBOUNCE_MS: u64 = 60_000;

impl KeeperSettings {
    /// Checks the values serde cannot: ranges, and names that must stay
    /// plain file names.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_IMPORT_ITEMS).contains(&self.import.max_items) {
            return Err(format!(
                "import.max_items must be between 1 and {}, got {}",
                MAX_IMPORT_ITEMS, self.import.max_items
            ));
        }
        if self.persistence.autosave_debounce_ms > MAX_AUTOSAVE_DEBOUNCE_MS {
            return Err(format!(
                "persistence.autosave_debounce_ms must be at most {}, got {}",
                MAX_AUTOSAVE_DEBOUNCE_MS, self.persistence.autosave_debounce_ms
            ));
        }
        if self.persistence.storage_key.trim().is_empty() {
            return Err("persistence.storage_key must not be empty".to_string());
        }
        plain_file_name("persistence.database_file", &self.persistence.database_file)?;
        plain_file_name("export.app_name", &self.export.app_name)
    }
}

fn plain_file_name(key: &str, name: &str) -> Result<(), String> {
    if name.trim().is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(format!("{} must be a plain file name, got '{}'", key, name));
    }
    Ok(())
}

/// Limits applied when reading bookmark files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportSettings {
    /// Maximum number of folders and bookmarks accepted from one file.
    pub max_items: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self { max_items: 10_000 }
    }
}

/// Where and how often the forest is written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistenceSettings {
    /// SQLite file name, relative to the platform data directory.
    pub database_file: String,
    /// Key under which the whole forest is stored.
    pub storage_key: String,
    pub autosave_debounce_ms: u64,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            database_file: "bookmarks.db".to_string(),
            storage_key: "bookmark-forest".to_string(),
            autosave_debounce_ms: 500,
        }
    }
}

/// Export file naming and document header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportSettings {
    /// Prefix of the export file name: `<app_name>_bookmarks.html`.
    pub app_name: String,
    /// Text of the `<TITLE>` and `<H1>` elements.
    pub document_title: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            app_name: "bookmark_keeper".to_string(),
            document_title: "Bookmarks".to_string(),
        }
    }
}
