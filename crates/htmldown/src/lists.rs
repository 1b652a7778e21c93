//! Pre-pass computing list item markers and indentation.
//!
//! Runs once per conversion, after the before-hooks and before the tree
//! reduction. Every `<li>` gets a [`ListItemMeta`] in the per-call side
//! table; the list-item rule consumes it exactly once. Nothing is stored on
//! the nodes themselves.

use tracing::trace;

use crate::node::{Node, NodeKey};
use crate::options::Options;
use crate::service::ConvertState;

/// Marker and indentation for one `<li>`.
#[derive(Debug, Clone)]
pub struct ListItemMeta {
    /// Marker text, e.g. `"- "` or `"3. "`
    pub marker: String,
    /// Width of the marker in columns
    pub marker_width: usize,
    /// Sum of ancestor item marker widths, so wrapped text and sub-lists
    /// align under the parent's text column rather than its glyph
    pub indent: usize,
}

/// Annotate every list whose nearest list ancestor is none; nested lists
/// are handled while walking their ancestor.
pub(crate) fn annotate_lists(root: &Node, options: &Options, state: &mut ConvertState) {
    if is_list(root) {
        annotate_list(root, 0, options, state);
        return;
    }
    walk(root, options, state);
}

fn walk(node: &Node, options: &Options, state: &mut ConvertState) {
    for child in node.children() {
        if is_list(child) {
            trace!(tag = child.tag_name(), "annotating top-level list");
            annotate_list(child, 0, options, state);
        } else {
            walk(child, options, state);
        }
    }
}

fn is_list(node: &Node) -> bool {
    node.is_element() && matches!(node.tag_name(), "ul" | "ol")
}

fn annotate_list(list: &Node, indent: usize, options: &Options, state: &mut ConvertState) {
    let ordered = list.tag_name() == "ol";
    let mut position = list
        .attr("start")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1);

    for child in list.children() {
        if !child.is_element() || child.tag_name() != "li" {
            continue;
        }

        let marker = if ordered {
            let marker = format!("{position}. ");
            position += 1;
            marker
        } else {
            format!("{} ", options.bullet_list_marker)
        };
        let marker_width = marker.chars().count();

        state.insert_list_item(
            NodeKey::of(child),
            ListItemMeta {
                marker,
                marker_width,
                indent,
            },
        );

        annotate_nested(child, indent + marker_width, options, state);
    }
}

/// Find lists nested below an item and annotate them with the item's
/// cumulative indentation.
fn annotate_nested(node: &Node, indent: usize, options: &Options, state: &mut ConvertState) {
    for child in node.children() {
        if is_list(child) {
            annotate_list(child, indent, options, state);
        } else {
            annotate_nested(child, indent, options, state);
        }
    }
}

/// Re-indent the continuation lines of a list item by `width` columns.
///
/// Stops at the first continuation line that is itself a list item: nested
/// sub-lists already carry their own absolute indentation from the
/// pre-pass.
pub(crate) fn indent_continuation_lines(content: &str, width: usize, options: &Options) -> String {
    let indent = " ".repeat(width);
    let mut lines = Vec::new();
    let mut done = false;

    for (i, line) in content.split('\n').enumerate() {
        if i == 0 || done || line.is_empty() {
            lines.push(line.to_string());
            continue;
        }
        if is_list_item_line(line, options) {
            done = true;
            lines.push(line.to_string());
            continue;
        }
        lines.push(format!("{indent}{line}"));
    }

    lines.join("\n")
}

fn is_list_item_line(line: &str, options: &Options) -> bool {
    let line = line.trim_start();

    let mut chars = line.chars();
    match chars.next() {
        Some(c) if c == options.bullet_list_marker || matches!(c, '-' | '*' | '+') => {
            chars.next() == Some(' ')
        }
        Some(c) if c.is_ascii_digit() => {
            let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
            rest.starts_with(". ")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str) -> Node {
        let mut li = Node::element("li");
        li.add_child(Node::text(text));
        li
    }

    #[test]
    fn unordered_markers() {
        let mut ul = Node::element("ul");
        ul.add_child(item("One"));
        ul.add_child(item("Two"));

        let mut state = ConvertState::default();
        annotate_lists(&ul, &Options::default(), &mut state);

        let meta = state.take_list_item(NodeKey::of(&ul.children[0])).unwrap();
        assert_eq!(meta.marker, "- ");
        assert_eq!(meta.marker_width, 2);
        assert_eq!(meta.indent, 0);
    }

    #[test]
    fn ordered_markers_respect_start() {
        let mut ol = Node::element_with_attrs("ol", vec![("start", "9")]);
        ol.add_child(item("Nine"));
        ol.add_child(item("Ten"));

        let mut state = ConvertState::default();
        annotate_lists(&ol, &Options::default(), &mut state);

        let nine = state.take_list_item(NodeKey::of(&ol.children[0])).unwrap();
        let ten = state.take_list_item(NodeKey::of(&ol.children[1])).unwrap();
        assert_eq!(nine.marker, "9. ");
        assert_eq!(ten.marker, "10. ");
        assert_eq!(ten.marker_width, 4);
    }

    #[test]
    fn nested_items_inherit_ancestor_widths() {
        let mut inner = Node::element("ul");
        inner.add_child(item("B"));
        let mut li = item("A");
        li.add_child(inner);
        let mut outer = Node::element("ul");
        outer.add_child(li);

        let mut state = ConvertState::default();
        annotate_lists(&outer, &Options::default(), &mut state);

        let inner_li = &outer.children[0].children[1].children[0];
        let meta = state.take_list_item(NodeKey::of(inner_li)).unwrap();
        assert_eq!(meta.indent, 2);
    }

    #[test]
    fn continuation_indent_stops_at_sub_list() {
        let options = Options::default();
        assert_eq!(
            indent_continuation_lines("A\nwrapped\n  - B", 2, &options),
            "A\n  wrapped\n  - B"
        );
    }

    #[test]
    fn list_item_line_detection() {
        let options = Options::default();
        assert!(is_list_item_line("- x", &options));
        assert!(is_list_item_line("  * x", &options));
        assert!(is_list_item_line("12. x", &options));
        assert!(!is_list_item_line("-x", &options));
        assert!(!is_list_item_line("12) x", &options));
        assert!(!is_list_item_line("plain", &options));
    }
}
