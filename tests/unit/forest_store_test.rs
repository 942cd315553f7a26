//! Unit tests for whole-forest persistence in the SQLite key/value store.

use std::sync::Arc;

use bookmark_keeper::database::Database;
use bookmark_keeper::managers::forest_store::{
    load_or_empty, ForestStore, SqliteForestStore, DEFAULT_STORAGE_KEY,
};
use bookmark_keeper::types::errors::StoreError;
use bookmark_keeper::types::node::{Forest, Node, NodeKind};

fn setup() -> SqliteForestStore {
    SqliteForestStore::open_in_memory().expect("in-memory store")
}

fn sample() -> Forest {
    let mut folder = Node::new_folder("Dev");
    let mut child = Node::new_bookmark("Rust", "https://rust-lang.org/");
    child.parent_id = Some(folder.id.clone());
    child.notes = Some("the language".to_string());
    child.tags.insert("lang".to_string());
    folder.kind = NodeKind::Folder {
        children: vec![Arc::new(child)],
    };
    Forest::from(vec![folder, Node::new_bookmark("Crates", "https://crates.io/")])
}

/// A single chain of `depth` folders with one bookmark at the bottom.
fn nested_chain(depth: usize) -> Forest {
    let mut bottom = Node::new_bookmark("Bottom", "https://bottom.example/");
    bottom.parent_id = Some(format!("f{}", depth - 1));
    let mut current = Arc::new(bottom);
    for level in (0..depth).rev() {
        let mut folder = Node::new_folder(&format!("Level {}", level));
        folder.id = format!("f{}", level);
        folder.parent_id = level.checked_sub(1).map(|p| format!("f{}", p));
        folder.kind = NodeKind::Folder {
            children: vec![current],
        };
        current = Arc::new(folder);
    }
    Forest::new(vec![current])
}

fn corrupt(db: &Database, key: &str) {
    db.connection()
        .execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, 'not json', 0)",
            [key],
        )
        .unwrap();
}

#[test]
fn test_load_without_saved_forest_is_empty() {
    let store = setup();
    assert!(store.load().unwrap().is_empty());
    assert_eq!(store.key(), DEFAULT_STORAGE_KEY);
}

#[test]
fn test_save_then_load_restores_structure() {
    let store = setup();
    let forest = sample();
    store.save(&forest).unwrap();

    let restored = store.load().unwrap();
    assert_eq!(restored, forest);
    assert!(!Forest::ptr_eq(&restored, &forest));
}

#[test]
fn test_save_overwrites_previous_snapshot() {
    let store = setup();
    store.save(&sample()).unwrap();
    let smaller = Forest::from(vec![Node::new_folder("Only")]);
    store.save(&smaller).unwrap();

    assert_eq!(store.load().unwrap(), smaller);
}

#[test]
fn test_clear_removes_snapshot() {
    let store = setup();
    store.save(&sample()).unwrap();
    store.clear().unwrap();
    assert!(store.load().unwrap().is_empty());
    // Clearing twice is harmless.
    store.clear().unwrap();
}

#[test]
fn test_empty_forest_round_trips() {
    let store = setup();
    store.save(&Forest::default()).unwrap();
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn test_stored_json_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shape.db");
    let forest = sample();
    SqliteForestStore::new(Database::open(&path).unwrap(), "shape")
        .save(&forest)
        .unwrap();

    let db = Database::open(&path).unwrap();
    let json: String = db
        .connection()
        .query_row("SELECT value FROM kv_store WHERE key = 'shape'", [], |row| row.get(0))
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value[0]["type"], "folder");
    assert_eq!(value[0]["title"], "Dev");
    assert!(value[0]["parentId"].is_null());
    assert!(value[0].get("children").is_none());
    let child = &value[1];
    assert_eq!(child["type"], "bookmark");
    assert_eq!(child["url"], "https://rust-lang.org/");
    assert_eq!(child["parentId"], value[0]["id"]);
    assert_eq!(child["notes"], "the language");
    assert_eq!(child["tags"], serde_json::json!(["lang"]));
}

#[test]
fn test_deeply_nested_forest_round_trips() {
    let store = setup();
    let forest = nested_chain(150);
    store.save(&forest).unwrap();

    let restored = store.load().unwrap();
    assert!(restored == forest);
    assert_eq!(bookmark_keeper::tree::count_by_type(&restored).total, 151);
    assert_eq!(load_or_empty(&store).len(), 1);
}

#[test]
fn test_forest_at_import_ceiling_depth_round_trips() {
    let store = setup();
    let forest = nested_chain(9_999);
    store.save(&forest).unwrap();

    let restored = store.load().unwrap();
    assert_eq!(bookmark_keeper::tree::count_by_type(&restored).folders, 9_999);
    assert!(restored == forest);
}

#[test]
fn test_keys_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keys.db");
    let a = SqliteForestStore::new(Database::open(&path).unwrap(), "a");
    let b = SqliteForestStore::new(Database::open(&path).unwrap(), "b");

    a.save(&sample()).unwrap();
    assert!(b.load().unwrap().is_empty());
    b.clear().unwrap();
    assert_eq!(a.load().unwrap().len(), 2);
}

#[test]
fn test_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reopen.db");
    let forest = sample();
    SqliteForestStore::new(Database::open(&path).unwrap(), DEFAULT_STORAGE_KEY)
        .save(&forest)
        .unwrap();

    let reopened = SqliteForestStore::new(Database::open(&path).unwrap(), DEFAULT_STORAGE_KEY);
    assert_eq!(reopened.load().unwrap(), forest);
}

#[test]
fn test_corrupted_snapshot_is_serialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.db");
    corrupt(&Database::open(&path).unwrap(), DEFAULT_STORAGE_KEY);

    let store = SqliteForestStore::new(Database::open(&path).unwrap(), DEFAULT_STORAGE_KEY);
    assert!(matches!(store.load(), Err(StoreError::SerializationError(_))));
}

#[test]
fn test_record_with_unknown_parent_is_serialization_error() {
    let db = Database::open_in_memory().unwrap();
    db.connection()
        .execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, 0)",
            [
                DEFAULT_STORAGE_KEY,
                r#"[{"id":"b","title":"B","parentId":"gone","type":"bookmark","url":"https://b.example/"}]"#,
            ],
        )
        .unwrap();
    let orphaned = SqliteForestStore::new(db, DEFAULT_STORAGE_KEY);

    match orphaned.load() {
        Err(StoreError::SerializationError(msg)) => assert!(msg.contains("unknown parent gone")),
        other => panic!("expected serialization error, got {:?}", other),
    }
}

#[test]
fn test_load_or_empty_recovers_from_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recover.db");
    corrupt(&Database::open(&path).unwrap(), DEFAULT_STORAGE_KEY);

    let store = SqliteForestStore::new(Database::open(&path).unwrap(), DEFAULT_STORAGE_KEY);
    assert!(load_or_empty(&store).is_empty());
}

#[test]
fn test_store_is_usable_as_trait_object() {
    let store: Arc<dyn ForestStore> = Arc::new(setup());
    let forest = sample();
    store.save(&forest).unwrap();
    assert_eq!(load_or_empty(store.as_ref()), forest);
}
