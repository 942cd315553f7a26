//! Netscape Bookmark File Format export, the inverse of the parser.

use std::fmt::Write as _;

use super::entities::escape;
use crate::types::node::{Forest, Node, NodeKind, NodeRef};

const INDENT: &str = "    ";
/// Indentation stops growing past this depth; it is cosmetic only.
const MAX_INDENT_LEVELS: usize = 32;

/// Default `<TITLE>`/`<H1>` text.
pub const DEFAULT_DOCUMENT_TITLE: &str = "Bookmarks";

fn header(document_title: &str) -> String {
    let title = escape(document_title);
    format!(
        "<!DOCTYPE NETSCAPE-Bookmark-file-1>\n\
         <!-- This is an automatically generated file.\n     \
         It will be read and overwritten.\n     \
         DO NOT EDIT! -->\n\
         <META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n\
         <TITLE>{title}</TITLE>\n\
         <H1>{title}</H1>\n"
    )
}

fn tags_attribute(node: &Node) -> String {
    if node.tags.is_empty() {
        return String::new();
    }
    let joined = node.tags.iter().map(String::as_str).collect::<Vec<_>>().join(",");
    format!(" TAGS=\"{}\"", escape(&joined))
}

fn write_item(out: &mut String, node: &Node, indent: &str) {
    let tags = tags_attribute(node);
    let title = escape(&node.title);
    // Writing to a String cannot fail.
    let _ = match &node.kind {
        NodeKind::Bookmark { url } => writeln!(
            out,
            "{indent}<DT><A HREF=\"{}\"{tags}>{title}</A></DT>",
            escape(url)
        ),
        NodeKind::Folder { .. } => writeln!(out, "{indent}<DT><H3{tags}>{title}</H3></DT>"),
    };
    if let Some(notes) = node.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        let _ = writeln!(out, "{indent}<DD>{}", escape(notes));
    }
}

fn indent(depth: usize) -> String {
    INDENT.repeat(depth.min(MAX_INDENT_LEVELS))
}

/// Renders the forest as a complete bookmark file.
///
/// Walks with an explicit stack of child iterators, so output depth is not
/// limited by the call stack. Empty folders still get an (empty) list.
pub fn serialize_bookmarks_html(forest: &Forest, document_title: &str) -> String {
    let mut out = header(document_title);
    out.push_str("<DL><p>\n");

    let mut stack: Vec<std::slice::Iter<'_, NodeRef>> = vec![forest.iter()];
    loop {
        let depth = stack.len();
        let Some(level) = stack.last_mut() else {
            break;
        };
        match level.next() {
            Some(node) => {
                let indent = indent(depth);
                write_item(&mut out, node, &indent);
                if let NodeKind::Folder { children } = &node.kind {
                    out.push_str(&indent);
                    out.push_str("<DL><p>\n");
                    stack.push(children.iter());
                }
            }
            None => {
                stack.pop();
                out.push_str(&indent(stack.len()));
                out.push_str("</DL><p>\n");
            }
        }
    }
    out
}

/// [`serialize_bookmarks_html`] with the default document title.
pub fn to_html(forest: &Forest) -> String {
    serialize_bookmarks_html(forest, DEFAULT_DOCUMENT_TITLE)
}
