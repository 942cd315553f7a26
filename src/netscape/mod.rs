//! Netscape Bookmark File Format (`<DL>`/`<DT>`/`<H3>`/`<A>`) import and export.
//!
//! This is the one bit-exact external contract: files written here must load
//! in browsers, and browser exports must load here.

pub mod entities;
pub mod parser;
pub mod serializer;

pub use parser::{parse_bookmarks_html, DEFAULT_MAX_ITEMS};
pub use serializer::{serialize_bookmarks_html, to_html};
