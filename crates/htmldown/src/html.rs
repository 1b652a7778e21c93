//! HTML parsing support.
//!
//! The engine consumes an already-built [`Node`] tree; this module is the
//! glue to an actual HTML parser for callers that start from a string.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::Node;

/// Parse an HTML string into a [`Node`] tree.
///
/// # Example
///
/// ```rust
/// use htmldown::{parse_html, Converter};
///
/// let mut root = parse_html("<h1>Hello <em>World</em></h1>");
///
/// let converter = Converter::new();
/// let markdown = converter.convert(&mut root).unwrap();
/// assert_eq!(markdown, "# Hello _World_");
/// ```
pub fn parse_html(html: &str) -> Node {
    let document = Html::parse_fragment(html);
    element_to_node(document.root_element())
}

/// Convert a scraper element to our tree structure.
fn element_to_node(element: ElementRef) -> Node {
    let attrs: Vec<(&str, &str)> = element.value().attrs().collect();
    let mut node = Node::element_with_attrs(element.value().name(), attrs);

    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => {
                node.add_child(Node::text(&text.text));
            }
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    node.add_child(element_to_node(child_element));
                }
            }
            _ => {}
        }
    }

    node
}
