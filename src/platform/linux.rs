// Linux paths follow the XDG base directory spec.
// Config: ~/.config/bookmark-keeper
// Data:   ~/.local/share/bookmark-keeper

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "bookmark-keeper";

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

fn xdg_or(var: &str, fallback: &[&str]) -> PathBuf {
    match env::var(var) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir).join(APP_DIR),
        _ => fallback
            .iter()
            .fold(home_dir(), |path, part| path.join(part))
            .join(APP_DIR),
    }
}

pub fn get_config_dir() -> PathBuf {
    xdg_or("XDG_CONFIG_HOME", &[".config"])
}

pub fn get_data_dir() -> PathBuf {
    xdg_or("XDG_DATA_HOME", &[".local", "share"])
}
