// Platform paths
// Per-OS locations for the settings file and the bookmark database.
//
// Uses `cfg(target_os)` to select the implementation at compile time.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/bookmark-keeper` or `~/.config/bookmark-keeper`
/// - **macOS**: `~/Library/Application Support/BookmarkKeeper`
/// - **Windows**: `%APPDATA%/BookmarkKeeper`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Directory holding the bookmark database.
///
/// - **Linux**: `$XDG_DATA_HOME/bookmark-keeper` or `~/.local/share/bookmark-keeper`
/// - **macOS**: `~/Library/Application Support/BookmarkKeeper`
/// - **Windows**: `%APPDATA%/BookmarkKeeper`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}
