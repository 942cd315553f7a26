// State managers
// The bookmark manager owns the current forest; the store and autosaver persist it.

pub mod autosave;
pub mod bookmark_manager;
pub mod forest_store;
