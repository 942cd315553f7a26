// Shared type definitions
// Each submodule defines types used across the crate.

pub mod errors;
pub mod node;
pub mod settings;
pub mod snapshot;
