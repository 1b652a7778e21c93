//! # htmldown
//!
//! Convert HTML element trees to CommonMark/GFM Markdown.
//!
//! The engine consumes a tree of element/text nodes and reduces it
//! depth-first through an ordered, tag-keyed rule registry. Rules are
//! extensible at build time (`add_rules`, `use_plugin`, `keep`, `remove`,
//! `before`, `after`); a configured [`Converter`] is immutable during
//! conversion and reusable across calls.
//!
//! ## Design
//!
//! HTML parsing is deliberately external: any parser can build the
//! [`Node`] structure. The optional `html` feature (enabled by default)
//! ships a scraper-backed adapter for convenience.
//!
//! ## Example (Node-based)
//!
//! ```rust
//! use htmldown::{Converter, Node};
//!
//! let mut h1 = Node::element("h1");
//! h1.add_child(Node::text("Hello World"));
//!
//! let converter = Converter::new();
//! let markdown = converter.convert(&mut h1).unwrap();
//! assert_eq!(markdown, "# Hello World");
//! ```
//!
//! ## Example (HTML string)
//!
//! ```rust
//! use htmldown::Converter;
//!
//! let converter = Converter::new();
//! let markdown = converter
//!     .convert_html("<p>Hello <strong>world</strong>.</p>")
//!     .unwrap();
//! assert_eq!(markdown, "Hello **world**.");
//! ```

#[cfg(feature = "html")]
pub mod html;
mod lists;
pub mod node;
mod options;
mod rules;
mod service;
mod utilities;

#[cfg(feature = "html")]
pub use html::parse_html;
pub use lists::ListItemMeta;
pub use node::{Node, NodeKey, NodeRef, NodeType};
pub use options::{
    CodeBlockStyle, EscapeMode, HeadingStyle, LinkReferenceStyle, LinkStyle, Options,
};
pub use rules::{commonmark_rules, AdvancedFn, Replacement, Rule, Rules, SimpleFn, TextFn};
pub use service::{ConvertState, Converter};
pub use utilities::*;

/// Error type for conversion operations
#[derive(Debug, thiserror::Error)]
pub enum HtmldownError {
    #[error("rule error: {0}")]
    Rule(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, HtmldownError>;
