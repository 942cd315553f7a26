//! Unit tests for the pure tree mutations.
//!
//! Covers insertion positions, removal, moves with cycle rejection, sibling
//! reordering, edits, bulk removal, and the no-op and sharing guarantees.

use std::collections::HashSet;
use std::sync::Arc;

use bookmark_keeper::tree::{
    edit, find_node_by_id, insert, move_node, remove, remove_many, rename, reorder, InsertPosition,
    NodeEdit,
};
use bookmark_keeper::types::node::{Forest, Node, NodeKind, NodeRef};
use rstest::rstest;

fn bookmark(id: &str, parent: Option<&str>) -> Node {
    Node {
        id: id.to_string(),
        title: id.to_uppercase(),
        parent_id: parent.map(str::to_string),
        tags: Default::default(),
        notes: None,
        kind: NodeKind::Bookmark {
            url: format!("https://{}.example.com", id),
        },
    }
}

fn folder(id: &str, parent: Option<&str>, children: Vec<Node>) -> Node {
    Node {
        id: id.to_string(),
        title: id.to_uppercase(),
        parent_id: parent.map(str::to_string),
        tags: Default::default(),
        notes: None,
        kind: NodeKind::Folder {
            children: children.into_iter().map(Arc::new).collect(),
        },
    }
}

/// work/{w1, projects/{p1, p2, deep/{d1}}, w2}, r1, empty/
fn sample() -> Forest {
    Forest::from(vec![
        folder(
            "work",
            None,
            vec![
                bookmark("w1", Some("work")),
                folder(
                    "projects",
                    Some("work"),
                    vec![
                        bookmark("p1", Some("projects")),
                        bookmark("p2", Some("projects")),
                        folder("deep", Some("projects"), vec![bookmark("d1", Some("deep"))]),
                    ],
                ),
                bookmark("w2", Some("work")),
            ],
        ),
        bookmark("r1", None),
        folder("empty", None, vec![]),
    ])
}

fn ids(nodes: &[NodeRef]) -> Vec<&str> {
    nodes.iter().map(|n| n.id.as_str()).collect()
}

fn children<'a>(forest: &'a Forest, id: &str) -> Vec<&'a str> {
    ids(find_node_by_id(forest, id).unwrap().children().unwrap())
}

fn node<'a>(forest: &'a Forest, id: &str) -> &'a NodeRef {
    find_node_by_id(forest, id).unwrap()
}

/// Every child's parent_id names its folder; roots have none.
fn assert_parent_links(forest: &Forest) {
    let mut stack: Vec<(Option<&str>, &NodeRef)> = forest.iter().map(|n| (None, n)).collect();
    while let Some((parent, node)) = stack.pop() {
        assert_eq!(node.parent_id.as_deref(), parent, "bad parent link on {}", node.id);
        if let Some(children) = node.children() {
            stack.extend(children.iter().map(|c| (Some(node.id.as_str()), c)));
        }
    }
}

// ─── Remove ───

#[test]
fn test_remove_nested_bookmark() {
    let before = sample();
    let after = remove(&before, "p1");

    assert!(find_node_by_id(&after, "p1").is_none());
    assert_eq!(children(&after, "projects"), ["p2", "deep"]);
    assert!(find_node_by_id(&before, "p1").is_some(), "input snapshot must be untouched");
}

#[test]
fn test_remove_folder_takes_subtree() {
    let after = remove(&sample(), "projects");
    assert!(find_node_by_id(&after, "deep").is_none());
    assert!(find_node_by_id(&after, "d1").is_none());
    assert_eq!(children(&after, "work"), ["w1", "w2"]);
}

#[test]
fn test_remove_unknown_returns_same_forest() {
    let before = sample();
    assert!(Forest::ptr_eq(&remove(&before, "nope"), &before));
}

#[test]
fn test_remove_is_idempotent() {
    let once = remove(&sample(), "w2");
    let twice = remove(&once, "w2");
    assert!(Forest::ptr_eq(&once, &twice));
}

// ─── Insert ───

#[test]
fn test_insert_root_prepends() {
    let after = insert(&sample(), &InsertPosition::Root, bookmark("n", Some("stale")));

    assert_eq!(ids(after.nodes()), ["n", "work", "r1", "empty"]);
    assert_eq!(node(&after, "n").parent_id, None);
}

#[test]
fn test_insert_inside_appends_and_sets_parent() {
    let after = insert(&sample(), &InsertPosition::Inside("projects".into()), bookmark("n", None));
    assert_eq!(children(&after, "projects"), ["p1", "p2", "deep", "n"]);
    assert_eq!(node(&after, "n").parent_id.as_deref(), Some("projects"));
    assert_parent_links(&after);
}

#[test]
fn test_insert_inside_empty_folder() {
    let position = InsertPosition::Inside("empty".into());
    let after = insert(&sample(), &position, folder("sub", None, vec![]));
    assert_eq!(children(&after, "empty"), ["sub"]);
    assert_parent_links(&after);
}

#[test]
fn test_insert_before_and_after_nested_sibling() {
    let forest = insert(&sample(), &InsertPosition::Before("p2".into()), bookmark("x", None));
    let forest = insert(&forest, &InsertPosition::After("p2".into()), bookmark("y", None));

    assert_eq!(children(&forest, "projects"), ["p1", "x", "p2", "y", "deep"]);
    assert_parent_links(&forest);
}

#[test]
fn test_insert_after_root_node() {
    let position = InsertPosition::After("empty".into());
    let after = insert(&sample(), &position, bookmark("z", Some("work")));
    assert_eq!(ids(after.nodes()), ["work", "r1", "empty", "z"]);
    assert_eq!(node(&after, "z").parent_id, None);
}

#[rstest]
#[case::unknown_folder(InsertPosition::Inside("nope".into()))]
#[case::inside_bookmark(InsertPosition::Inside("r1".into()))]
#[case::before_unknown(InsertPosition::Before("nope".into()))]
#[case::after_unknown(InsertPosition::After("nope".into()))]
fn test_insert_without_valid_target_is_noop(#[case] position: InsertPosition) {
    let before = sample();
    let after = insert(&before, &position, bookmark("n", None));
    assert!(Forest::ptr_eq(&before, &after));
}

// ─── Move ───

#[test]
fn test_move_into_folder() {
    let after = move_node(&sample(), "r1", Some("deep"));

    assert_eq!(ids(after.nodes()), ["work", "empty"]);
    assert_eq!(children(&after, "deep"), ["d1", "r1"]);
    assert_eq!(node(&after, "r1").parent_id.as_deref(), Some("deep"));
    assert_parent_links(&after);
}

#[test]
fn test_move_folder_keeps_subtree() {
    let after = move_node(&sample(), "projects", Some("empty"));
    assert_eq!(children(&after, "empty"), ["projects"]);
    assert_eq!(children(&after, "projects"), ["p1", "p2", "deep"]);
    assert_eq!(children(&after, "work"), ["w1", "w2"]);
    assert_parent_links(&after);
}

#[test]
fn test_move_to_root_prepends() {
    let after = move_node(&sample(), "d1", None);
    assert_eq!(ids(after.nodes()), ["d1", "work", "r1", "empty"]);
    assert_eq!(node(&after, "d1").parent_id, None);
    assert!(children(&after, "deep").is_empty());
}

#[rstest]
#[case::into_itself("work", "work")]
#[case::into_child("work", "projects")]
#[case::into_grandchild("work", "deep")]
#[case::nested_into_own_child("projects", "deep")]
fn test_move_into_own_subtree_is_rejected(#[case] id: &str, #[case] target: &str) {
    let before = sample();
    let after = move_node(&before, id, Some(target));
    assert!(Forest::ptr_eq(&before, &after));
}

#[rstest]
#[case::unknown_node("nope", Some("empty"))]
#[case::unknown_target("r1", Some("nope"))]
#[case::bookmark_target("w1", Some("r1"))]
fn test_move_with_invalid_arguments_is_noop(#[case] id: &str, #[case] target: Option<&str>) {
    let before = sample();
    let after = move_node(&before, id, target);
    assert!(Forest::ptr_eq(&before, &after));
}

// ─── Reorder ───

#[test]
fn test_reorder_is_array_move() {
    let forest = Forest::from(vec![folder(
        "f",
        None,
        vec![
            bookmark("a", Some("f")),
            bookmark("b", Some("f")),
            bookmark("c", Some("f")),
            bookmark("d", Some("f")),
        ],
    )]);

    let after = reorder(&forest, Some("f"), "b", "d");
    assert_eq!(children(&after, "f"), ["a", "c", "d", "b"]);

    let back = reorder(&after, Some("f"), "b", "a");
    assert_eq!(children(&back, "f"), ["b", "a", "c", "d"]);
}

#[test]
fn test_reorder_root_level() {
    let after = reorder(&sample(), None, "work", "empty");
    assert_eq!(ids(after.nodes()), ["r1", "empty", "work"]);
}

#[rstest]
#[case::same_id(Some("projects"), "p1", "p1")]
#[case::different_parents(Some("projects"), "p1", "w1")]
#[case::wrong_parent(Some("work"), "p1", "p2")]
#[case::unknown_parent(Some("nope"), "p1", "p2")]
#[case::parent_is_bookmark(Some("r1"), "p1", "p2")]
#[case::nested_ids_at_root(None, "p1", "p2")]
fn test_reorder_invalid_is_noop(
    #[case] parent: Option<&str>,
    #[case] active: &str,
    #[case] over: &str,
) {
    let before = sample();
    assert!(Forest::ptr_eq(&before, &reorder(&before, parent, active, over)));
}

// ─── Rename / Edit ───

#[test]
fn test_rename_shares_untouched_subtrees() {
    let before = sample();
    let after = rename(&before, "d1", "Renamed");

    assert_eq!(node(&after, "d1").title, "Renamed");
    assert_eq!(node(&after, "d1").url(), Some("https://d1.example.com"));

    // Path to the change is rebuilt.
    for id in ["work", "projects", "deep", "d1"] {
        assert!(!Arc::ptr_eq(node(&before, id), node(&after, id)), "{} should be new", id);
    }
    // Everything else is the very same allocation.
    for id in ["w1", "w2", "p1", "p2", "r1", "empty"] {
        assert!(Arc::ptr_eq(node(&before, id), node(&after, id)), "{} should be shared", id);
    }
}

#[test]
fn test_rename_unknown_or_unchanged_is_noop() {
    let before = sample();
    assert!(Forest::ptr_eq(&before, &rename(&before, "nope", "X")));
    assert!(Forest::ptr_eq(&before, &rename(&before, "r1", "R1")));
}

#[test]
fn test_rename_folder_keeps_children() {
    let after = rename(&sample(), "projects", "Code");
    assert_eq!(node(&after, "projects").title, "Code");
    assert_eq!(children(&after, "projects"), ["p1", "p2", "deep"]);
}

#[test]
fn test_edit_bookmark_fields() {
    let changes = NodeEdit {
        url: Some("https://changed.example.com".into()),
        notes: Some(Some("read later".into())),
        tags: Some(["rust".to_string(), "async".to_string()].into_iter().collect()),
        ..NodeEdit::default()
    };
    let after = edit(&sample(), "p2", &changes);
    let p2 = node(&after, "p2");

    assert_eq!(p2.title, "P2");
    assert_eq!(p2.url(), Some("https://changed.example.com"));
    assert_eq!(p2.notes.as_deref(), Some("read later"));
    assert_eq!(p2.tags.iter().map(String::as_str).collect::<Vec<_>>(), ["async", "rust"]);

    let cleared = edit(
        &after,
        "p2",
        &NodeEdit {
            notes: Some(None),
            ..NodeEdit::default()
        },
    );
    assert_eq!(node(&cleared, "p2").notes, None);
}

#[test]
fn test_edit_url_on_folder_is_ignored() {
    let before = sample();
    let changes = NodeEdit {
        url: Some("https://folder.example.com".into()),
        ..NodeEdit::default()
    };
    assert!(Forest::ptr_eq(&before, &edit(&before, "projects", &changes)));
}

// ─── Remove many ───

#[test]
fn test_remove_many_drops_bookmarks_only() {
    let selected: HashSet<String> =
        ["p1", "d1", "r1", "work"].iter().map(|s| s.to_string()).collect();
    let after = remove_many(&sample(), &selected);

    assert_eq!(ids(after.nodes()), ["work", "empty"]);
    assert_eq!(children(&after, "projects"), ["p2", "deep"]);
    assert!(children(&after, "deep").is_empty());
}

#[test]
fn test_remove_many_empty_or_unknown_is_noop() {
    let before = sample();
    assert!(Forest::ptr_eq(&before, &remove_many(&before, &HashSet::new())));

    let unknown: HashSet<String> = ["zz".to_string(), "empty".to_string()].into_iter().collect();
    assert!(Forest::ptr_eq(&before, &remove_many(&before, &unknown)));
}

// ─── Deep nesting ───

/// A chain of `depth` folders ("f0" outermost) ending in one bookmark, "bottom".
fn nested_chain(depth: usize) -> Forest {
    let mut current = Arc::new(bookmark("bottom", Some(format!("f{}", depth - 1).as_str())));
    for level in (0..depth).rev() {
        let parent = level.checked_sub(1).map(|p| format!("f{}", p));
        let mut node = Node::new_folder(&format!("F{}", level));
        node.id = format!("f{}", level);
        node.parent_id = parent;
        node.kind = NodeKind::Folder {
            children: vec![current],
        };
        current = Arc::new(node);
    }
    Forest::new(vec![current])
}

const CEILING_DEPTH: usize = 9_999;

#[test]
fn test_remove_at_ceiling_depth() {
    let forest = nested_chain(CEILING_DEPTH);
    assert!(Forest::ptr_eq(&remove(&forest, "nope"), &forest));

    let trimmed = remove(&forest, "bottom");
    assert!(find_node_by_id(&trimmed, "bottom").is_none());
    assert!(find_node_by_id(&trimmed, &format!("f{}", CEILING_DEPTH - 1)).is_some());

    let cut = remove(&forest, "f1");
    assert_eq!(find_node_by_id(&cut, "f0").unwrap().children().unwrap().len(), 0);
    drop(forest);
    drop(trimmed);
    drop(cut);
}

#[test]
fn test_edits_at_ceiling_depth() {
    let forest = nested_chain(CEILING_DEPTH);
    let bottom_parent = format!("f{}", CEILING_DEPTH - 1);

    let renamed = rename(&forest, "f0", "Top");
    assert_eq!(renamed.nodes()[0].title, "Top");
    assert!(Arc::ptr_eq(
        &renamed.nodes()[0].children().unwrap()[0],
        &forest.nodes()[0].children().unwrap()[0]
    ));
    assert!(Forest::ptr_eq(&rename(&forest, "f0", "F0"), &forest));

    let renamed_deep = rename(&forest, "bottom", "Deepest");
    assert_eq!(find_node_by_id(&renamed_deep, "bottom").unwrap().title, "Deepest");

    let moved = move_node(&forest, "bottom", None);
    assert_eq!(moved.nodes()[0].id, "bottom");
    assert!(find_node_by_id(&moved, &bottom_parent).unwrap().children().unwrap().is_empty());

    let ids: HashSet<String> = ["bottom".to_string()].into_iter().collect();
    let pruned = remove_many(&forest, &ids);
    assert!(find_node_by_id(&pruned, "bottom").is_none());
    assert!(Forest::ptr_eq(&remove_many(&forest, &HashSet::from(["f3".to_string()])), &forest));
}
