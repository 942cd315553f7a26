//! Bookmark Keeper: an immutable bookmark-tree engine.
//!
//! Parses Netscape bookmark files into a forest of folders and bookmarks,
//! edits it through pure snapshot-producing operations, persists whole
//! snapshots to SQLite and writes the forest back out as a bookmark file.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod netscape;
pub mod platform;
pub mod services;
pub mod tree;
pub mod types;
