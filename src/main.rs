//! Bookmark Keeper demo.
//!
//! Walks through import, queries, edits, duplicate cleanup, export and
//! persistence against an in-memory database. Pass a bookmark file path to
//! import it instead of the built-in sample. Set `RUST_LOG=debug` to see the
//! engine's log events.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use bookmark_keeper::managers::autosave::Autosaver;
use bookmark_keeper::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use bookmark_keeper::managers::forest_store::{ForestStore, SqliteForestStore};
use bookmark_keeper::services::file_io;
use bookmark_keeper::tree::{self, InsertPosition};
use tracing_subscriber::EnvFilter;

const SAMPLE: &str = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=UTF-8">
<TITLE>Bookmarks</TITLE>
<H1>Bookmarks</H1>
<DL><p>
    <DT><H3>Toolbar</H3>
    <DL><p>
        <DT><A HREF="https://www.rust-lang.org/">Rust</A>
        <DT><A HREF="https://docs.rs/">Docs.rs</A>
        <DT><H3>Reading</H3>
        <DL><p>
            <DT><A HREF="https://doc.rust-lang.org/book/">The Book</A>
            <DD>Start here
        </DL><p>
    </DL><p>
    <DT><A HREF="https://docs.rs/">docs.rs (again)</A>
    <DT><A HREF="https://crates.io/">crates.io</A>
</DL><p>
"#;

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("Bookmark Keeper v{} (demo)", env!("CARGO_PKG_VERSION"));
    println!();

    let store = Arc::new(SqliteForestStore::open_in_memory()?);
    let mut manager = BookmarkManager::default();
    let autosave_store: Arc<dyn ForestStore> = store.clone();
    manager.attach_autosaver(Autosaver::spawn(autosave_store, Duration::from_millis(200)));

    section("Import");
    let html = match std::env::args().nth(1) {
        Some(path) => file_io::read_import_file(&path).await?,
        None => SAMPLE.to_string(),
    };
    let counts = manager.import_html(&html)?;
    println!(
        "  {} items: {} folders, {} bookmarks",
        counts.total, counts.folders, counts.bookmarks
    );

    section("Search");
    let hits = manager.search("book");
    println!(
        "  'book' keeps {} root(s), {} folder(s) marked as containing hits",
        hits.nodes.len(),
        hits.matching_folder_ids.len()
    );

    section("Edit");
    let folder = manager.add_folder("Inbox", InsertPosition::Root)?;
    if let Some(folder_id) = &folder {
        let inside = InsertPosition::Inside(folder_id.clone());
        manager.add_bookmark("Tokio", "https://tokio.rs/", inside)?;
        let moved = manager.move_node(folder_id, Some(folder_id));
        println!("  Moving a folder into itself changed the tree: {}", moved);
        manager.rename(folder_id, "Later")?;
    }
    println!("  Stats after edits: {:?}", manager.stats());

    section("Duplicates");
    let groups = manager.duplicates();
    for group in &groups {
        println!("  {} appears {} times", group.url, group.ids.len());
    }
    let extra: HashSet<String> = groups
        .iter()
        .flat_map(|g| g.ids.iter().skip(1).cloned())
        .collect();
    manager.remove_duplicates(&extra);
    println!("  Remaining duplicate ids: {}", tree::duplicate_ids(manager.forest()).len());

    section("Export");
    let exported = manager.export_html();
    println!("  {} bytes of HTML", exported.len());
    println!("  Would download as {}", file_io::export_file_name("bookmark_keeper"));

    section("Persistence");
    if let Some(autosaver) = manager.detach_autosaver() {
        autosaver.shutdown().await?;
    }
    let restored = store.load()?;
    println!(
        "  Restored {} root node(s); matches memory: {}",
        restored.len(),
        &restored == manager.forest()
    );

    Ok(())
}
