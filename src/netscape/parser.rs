//! Netscape Bookmark File Format import.
//!
//! The document is split into tags and text with a tolerant regex tokenizer
//! (browser exports are tag soup: `<DT>` and `<p>` are never closed), then
//! folded into a forest by a stack machine, one frame per open `<DL>`.
//!
//! A folder heading claims the next `<DL>` that opens before another `<DT>`
//! or the end of its own list. This covers both the browser layout, where the
//! list follows the unclosed `<DT><H3>`, and `<DT><H3>..</H3></DT><DL>`.

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::debug;
use uuid::Uuid;

use super::entities::unescape;
use crate::types::errors::ParseError;
use crate::types::node::{Forest, Node, NodeKind};

/// Item ceiling used when no setting overrides it.
pub const DEFAULT_MAX_ITEMS: usize = 10_000;

pub const UNTITLED_BOOKMARK: &str = "Untitled Bookmark";
pub const UNTITLED_FOLDER: &str = "Untitled Folder";

/// Elements whose nesting decides whether a `<DL>` is a direct child of `<BODY>`.
const CONTAINERS: &[&str] = &[
    "article", "aside", "blockquote", "div", "dl", "footer", "form", "header", "main", "nav",
    "ol", "section", "span", "table", "ul",
];

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<(/?)([A-Za-z][A-Za-z0-9]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
            .expect("valid tag pattern")
    })
}

fn attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
            .expect("valid attribute pattern")
    })
}

#[derive(Debug)]
enum Token<'a> {
    Open { name: String, attrs: &'a str },
    Close { name: String },
    Text(&'a str),
}

fn tokenize(html: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for caps in tag_regex().captures_iter(html) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(Token::Text(&html[last..whole.start()]));
        }
        let name = name.as_str().to_ascii_lowercase();
        if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
            tokens.push(Token::Close { name });
        } else {
            let attrs = caps.get(3).map_or("", |m| m.as_str());
            tokens.push(Token::Open { name, attrs });
        }
        last = whole.end();
    }
    if last < html.len() {
        tokens.push(Token::Text(&html[last..]));
    }
    tokens
}

/// Looks up an attribute by case-insensitive name and decodes its value.
fn attribute(attrs: &str, wanted: &str) -> Option<String> {
    attr_regex().captures_iter(attrs).find_map(|caps| {
        let name = caps.get(1)?;
        if !name.as_str().eq_ignore_ascii_case(wanted) {
            return None;
        }
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        Some(unescape(value))
    })
}

fn parse_tags(attrs: &str) -> BTreeSet<String> {
    attribute(attrs, "tags")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Index of the list to import: the first `<DL>` directly under `<BODY>`,
/// else the first `<DL>` anywhere.
fn locate_root_list(tokens: &[Token<'_>]) -> Option<usize> {
    let mut first_list = None;
    let mut in_body = false;
    let mut open: Vec<&str> = Vec::new();

    for (idx, token) in tokens.iter().enumerate() {
        match token {
            Token::Open { name, .. } if name == "body" => {
                in_body = true;
                open.clear();
            }
            Token::Close { name } if name == "body" => in_body = false,
            Token::Open { name, .. } if name == "dl" => {
                if in_body && open.is_empty() {
                    return Some(idx);
                }
                first_list.get_or_insert(idx);
                if in_body {
                    open.push(name);
                }
            }
            Token::Open { name, .. } if in_body && CONTAINERS.contains(&name.as_str()) => {
                open.push(name);
            }
            Token::Close { name } if in_body => {
                if let Some(pos) = open.iter().rposition(|n| *n == name.as_str()) {
                    open.truncate(pos);
                }
            }
            _ => {}
        }
    }
    first_list
}

/// A folder whose children are still being collected.
#[derive(Debug)]
struct FolderDraft {
    id: String,
    title: String,
    parent_id: Option<String>,
    tags: BTreeSet<String>,
    notes: Option<String>,
}

impl FolderDraft {
    fn finish(self, children: Vec<Node>) -> Node {
        Node {
            id: self.id,
            title: self.title,
            parent_id: self.parent_id,
            tags: self.tags,
            notes: self.notes,
            kind: NodeKind::Folder {
                children: children.into_iter().map(Arc::new).collect(),
            },
        }
    }
}

/// One open `<DL>`. `owner` is `None` only for the root list.
#[derive(Debug, Default)]
struct ListFrame {
    owner: Option<FolderDraft>,
    items: Vec<Node>,
    /// Folder heading waiting for its `<DL>`.
    pending: Option<FolderDraft>,
}

impl ListFrame {
    fn owner_id(&self) -> Option<String> {
        self.owner.as_ref().map(|f| f.id.clone())
    }

    /// A heading that never received a list becomes an empty folder.
    fn settle_pending(&mut self) {
        if let Some(draft) = self.pending.take() {
            self.items.push(draft.finish(Vec::new()));
        }
    }

    fn annotate(&mut self, notes: String) {
        if let Some(draft) = self.pending.as_mut() {
            draft.notes = Some(notes);
        } else if let Some(last) = self.items.last_mut() {
            last.notes = Some(notes);
        }
    }
}

#[derive(Debug)]
enum Capture {
    Idle,
    Anchor {
        href: String,
        tags: BTreeSet<String>,
        text: String,
    },
    Heading {
        tag: String,
        tags: BTreeSet<String>,
        text: String,
    },
    Description {
        text: String,
    },
}

struct TreeBuilder {
    root: ListFrame,
    nested: Vec<ListFrame>,
    capture: Capture,
    in_item: bool,
    /// Depth of a stray `<DL>` (not claimed by a heading) being skipped.
    skip_depth: usize,
    count: usize,
    max_items: usize,
}

impl TreeBuilder {
    fn new(max_items: usize) -> Self {
        Self {
            root: ListFrame::default(),
            nested: Vec::new(),
            capture: Capture::Idle,
            in_item: false,
            skip_depth: 0,
            count: 0,
            max_items,
        }
    }

    fn frame(&mut self) -> &mut ListFrame {
        self.nested.last_mut().unwrap_or(&mut self.root)
    }

    fn closes_heading(&self, tag: &str) -> bool {
        matches!(&self.capture, Capture::Heading { tag: open, .. } if open == tag)
    }

    fn count_item(&mut self) -> Result<(), ParseError> {
        self.count += 1;
        if self.count > self.max_items {
            return Err(ParseError::LimitExceeded {
                limit: self.max_items,
            });
        }
        Ok(())
    }

    /// Completes whatever element text is being collected.
    fn end_capture(&mut self) -> Result<(), ParseError> {
        match std::mem::replace(&mut self.capture, Capture::Idle) {
            Capture::Idle => {}
            Capture::Anchor { href, tags, text } => {
                self.in_item = false;
                if href.trim().is_empty() {
                    debug!("skipping anchor without href");
                    return Ok(());
                }
                self.count_item()?;
                let title = non_empty_or(&text, UNTITLED_BOOKMARK);
                let frame = self.frame();
                let parent_id = frame.owner_id();
                frame.items.push(Node {
                    id: Uuid::new_v4().to_string(),
                    title,
                    parent_id,
                    tags,
                    notes: None,
                    kind: NodeKind::Bookmark { url: href },
                });
            }
            Capture::Heading { tags, text, .. } => {
                self.in_item = false;
                self.count_item()?;
                let title = non_empty_or(&text, UNTITLED_FOLDER);
                let frame = self.frame();
                frame.settle_pending();
                let parent_id = frame.owner_id();
                frame.pending = Some(FolderDraft {
                    id: Uuid::new_v4().to_string(),
                    title,
                    parent_id,
                    tags,
                    notes: None,
                });
            }
            Capture::Description { text } => {
                let notes = text.trim();
                if !notes.is_empty() {
                    let notes = notes.to_string();
                    self.frame().annotate(notes);
                }
            }
        }
        Ok(())
    }

    /// Closes the innermost list. Returns the root items once the root closes.
    fn close_list(&mut self) -> Result<Option<Vec<Node>>, ParseError> {
        self.end_capture()?;
        let Some(mut frame) = self.nested.pop() else {
            self.root.settle_pending();
            return Ok(Some(std::mem::take(&mut self.root.items)));
        };
        frame.settle_pending();
        if let Some(owner) = frame.owner {
            let folder = owner.finish(frame.items);
            self.frame().items.push(folder);
        }
        Ok(None)
    }

    /// Feeds one token. Returns the root items when the root list closes.
    fn feed(&mut self, token: &Token<'_>) -> Result<Option<Vec<Node>>, ParseError> {
        if self.skip_depth > 0 {
            match token {
                Token::Open { name, .. } if name == "dl" => self.skip_depth += 1,
                Token::Close { name } if name == "dl" => self.skip_depth -= 1,
                _ => {}
            }
            return Ok(None);
        }

        match token {
            Token::Text(text) => match &mut self.capture {
                Capture::Anchor { text: buf, .. }
                | Capture::Heading { text: buf, .. }
                | Capture::Description { text: buf } => buf.push_str(&unescape(text)),
                Capture::Idle => {}
            },
            Token::Open { name, attrs } => match name.as_str() {
                "dt" => {
                    self.end_capture()?;
                    self.frame().settle_pending();
                    self.in_item = true;
                }
                "a" if self.in_item && matches!(self.capture, Capture::Idle) => {
                    self.capture = Capture::Anchor {
                        href: attribute(attrs, "href").unwrap_or_default(),
                        tags: parse_tags(attrs),
                        text: String::new(),
                    };
                }
                tag if is_heading(tag) && self.in_item && matches!(self.capture, Capture::Idle) => {
                    self.capture = Capture::Heading {
                        tag: tag.to_string(),
                        tags: parse_tags(attrs),
                        text: String::new(),
                    };
                }
                "dd" => {
                    self.end_capture()?;
                    self.in_item = false;
                    self.capture = Capture::Description {
                        text: String::new(),
                    };
                }
                "dl" => {
                    self.end_capture()?;
                    self.in_item = false;
                    match self.frame().pending.take() {
                        Some(owner) => self.nested.push(ListFrame {
                            owner: Some(owner),
                            ..ListFrame::default()
                        }),
                        None => self.skip_depth = 1,
                    }
                }
                _ => {}
            },
            Token::Close { name } => match name.as_str() {
                "a" if matches!(self.capture, Capture::Anchor { .. }) => self.end_capture()?,
                tag if self.closes_heading(tag) => self.end_capture()?,
                "dt" => {
                    if !matches!(self.capture, Capture::Description { .. }) {
                        self.end_capture()?;
                    }
                    self.in_item = false;
                }
                "dl" => return self.close_list(),
                _ => {}
            },
        }
        Ok(None)
    }

    /// Closes every list left open at end of input.
    fn finish(mut self) -> Result<Vec<Node>, ParseError> {
        loop {
            if let Some(items) = self.close_list()? {
                return Ok(items);
            }
        }
    }
}

fn non_empty_or(text: &str, fallback: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parses a Netscape bookmark file into a forest with fresh ids.
///
/// Fails with [`ParseError::NoListFound`] when the document has no `<DL>`,
/// and with [`ParseError::LimitExceeded`] as soon as more than `max_items`
/// folders and bookmarks have been read. `<DT>` entries holding neither an
/// anchor nor a heading are skipped.
pub fn parse_bookmarks_html(html: &str, max_items: usize) -> Result<Forest, ParseError> {
    let cleaned = comment_regex().replace_all(html, "");
    let tokens = tokenize(&cleaned);
    let start = locate_root_list(&tokens).ok_or(ParseError::NoListFound)?;

    let mut builder = TreeBuilder::new(max_items);
    for token in &tokens[start + 1..] {
        if let Some(items) = builder.feed(token)? {
            debug!(items = builder.count, "bookmark list parsed");
            return Ok(Forest::from(items));
        }
    }
    let count = builder.count;
    let items = builder.finish()?;
    debug!(items = count, "bookmark list parsed (unterminated)");
    Ok(Forest::from(items))
}
