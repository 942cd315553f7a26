// Settings Engine
// Loads, saves, updates and resets KeeperSettings, which are stored as a JSON
// file at the platform-specific config path. Every accepted change passes
// KeeperSettings::validate first.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::KeeperSettings;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<KeeperSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &KeeperSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine implementation that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: KeeperSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses the platform-specific config directory with `settings.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => {
                let config_dir = platform::get_config_dir();
                config_dir
                    .join("settings.json")
                    .to_string_lossy()
                    .to_string()
            }
        };

        Self {
            config_path,
            settings: KeeperSettings::default(),
        }
    }
}

/// Turns a dot path (`persistence.autosave_debounce_ms`) into a JSON pointer.
fn key_to_pointer(key: &str) -> String {
    key.split('.')
        .map(|part| part.replace('~', "~0").replace('/', "~1"))
        .fold(String::new(), |mut pointer, part| {
            pointer.push('/');
            pointer.push_str(&part);
            pointer
        })
}

fn invalid(key: &str, reason: impl std::fmt::Display) -> SettingsError {
    SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, reason))
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// A missing file yields defaults. A file that does not parse is a
    /// serialization error; one that parses but holds out-of-range values
    /// (see [`KeeperSettings::validate`]) is an invalid-value error.
    fn load(&mut self) -> Result<KeeperSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            debug!(path = %self.config_path, "no settings file, using defaults");
            self.settings = KeeperSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: KeeperSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        settings.validate().map_err(SettingsError::InvalidValue)?;

        debug!(
            path = %self.config_path,
            max_items = settings.import.max_items,
            debounce_ms = settings.persistence.autosave_debounce_ms,
            "settings loaded"
        );
        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings to the JSON config file.
    ///
    /// Creates parent directories if they don't exist.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        info!(path = %self.config_path, "settings saved");
        Ok(())
    }

    fn get_settings(&self) -> &KeeperSettings {
        &self.settings
    }

    /// Updates one setting (or a whole section) by dot path, validates the
    /// result and saves it. On any error the in-memory settings are unchanged.
    ///
    /// - `"import.max_items"`: the import ceiling
    /// - `"persistence.autosave_debounce_ms"`: the autosave delay
    /// - `"export"`: the whole export section
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let mut tree = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;
        let slot = tree.pointer_mut(&key_to_pointer(key)).ok_or_else(|| {
            SettingsError::InvalidKey(format!("Key '{}' not found in settings", key))
        })?;
        *slot = value;

        let updated: KeeperSettings = serde_json::from_value(tree).map_err(|e| invalid(key, e))?;
        updated.validate().map_err(|e| invalid(key, e))?;

        self.settings = updated;
        self.save()
    }

    /// Resets all settings to factory defaults and saves to disk.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = KeeperSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
