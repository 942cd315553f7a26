// File collaborators
// Reads import files and writes export files. The tree engine only ever sees
// strings; these helpers are the async edge.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::types::errors::ParseError;

/// Reads a bookmark file. Bytes that are not valid UTF-8 are replaced.
pub async fn read_import_file<P: AsRef<Path>>(path: P) -> Result<String, ParseError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        warn!(path = %path.display(), error = %e, "import file unreadable");
        ParseError::Unreadable(format!("{}: {}", path.display(), e))
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// `<app_name>_bookmarks.html`
pub fn export_file_name(app_name: &str) -> String {
    format!("{}_bookmarks.html", app_name)
}

/// Writes `html` into `dir` under [`export_file_name`], creating `dir` if
/// needed. Returns the written path.
pub async fn write_export_file<P: AsRef<Path>>(
    dir: P,
    app_name: &str,
    html: &str,
) -> Result<PathBuf, std::io::Error> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(export_file_name(app_name));
    tokio::fs::write(&path, html).await?;
    info!(path = %path.display(), bytes = html.len(), "bookmarks exported");
    Ok(path)
}
