// Services: configuration and file collaborators.

pub mod file_io;
pub mod settings_engine;
