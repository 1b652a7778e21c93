//! GFM table rules.

use once_cell::sync::Lazy;
use regex::Regex;

use htmldown::{Node, NodeKey, NodeRef, Rule};

/// Create the table rules.
pub(crate) fn table_rules() -> Vec<Rule> {
    vec![table_rule(), row_rule(), cell_rule(), caption_rule()]
}

/// Relocate every `<caption>` to be a sibling immediately after its
/// `<table>`, so the caption text cannot end up between the pipes.
pub(crate) fn hoist_captions(node: &mut Node) {
    let mut i = 0;
    while i < node.children.len() {
        hoist_captions(&mut node.children[i]);

        let child = &node.children[i];
        if child.is_element() && child.tag_name() == "table" {
            let caption_position = child
                .children
                .iter()
                .position(|c| c.is_element() && c.tag_name() == "caption");

            if let Some(position) = caption_position {
                let caption = node.children[i].children.remove(position);
                node.children.insert(i + 1, caption);
                i += 1;
            }
        }

        i += 1;
    }
}

fn table_rule() -> Rule {
    Rule::simple(&["table"], |content, node, _| {
        let has_header =
            node.node().has_descendant("thead") || node.node().has_descendant("th");

        let mut table = String::new();
        if !has_header {
            table.push_str(&synthesized_header(max_columns(node.node())));
        }
        table.push_str(content.trim_start_matches('\n'));

        Ok(Some(format!("\n\n{table}\n\n")))
    })
}

fn row_rule() -> Rule {
    Rule::simple(&["tr"], |content, node, _| {
        let mut row = format!("{}\n", content.trim_end());

        if is_heading_row(node) {
            let cells = node
                .element_children()
                .filter(|c| matches!(c.tag_name(), "th" | "td"));

            for (i, cell) in cells.enumerate() {
                let marker = alignment_marker(cell.attr("align"));
                if i == 0 {
                    row.push_str(&format!("| {marker} |"));
                } else {
                    row.push_str(&format!(" {marker} |"));
                }
            }
            row.push('\n');
        }

        Ok(Some(row))
    })
}

static CELL_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").expect("valid regex"));

fn cell_rule() -> Rule {
    Rule::simple(&["th", "td"], |content, node, _| {
        let content = CELL_NEWLINES.replace_all(content.trim(), "<br>");
        let content = content.replace('|', "\\|");

        if node.element_index() == 0 {
            Ok(Some(format!("| {content} |")))
        } else {
            Ok(Some(format!(" {content} |")))
        }
    })
}

fn caption_rule() -> Rule {
    Rule::simple(&["caption"], |content, _, _| {
        Ok(Some(format!("\n\n{}\n\n", content.trim())))
    })
}

/// A row is a heading row inside `<thead>`, or as the first row of a
/// `<thead>`-less table when it carries a `<th>`.
fn is_heading_row(node: &NodeRef<'_>) -> bool {
    if node.parent_tag() == Some("thead") {
        return true;
    }

    let Some(table) = node.closest("table") else {
        return false;
    };
    if table.has_descendant("thead") {
        return false;
    }

    let contains_th = node.element_children().any(|c| c.tag_name() == "th");
    contains_th
        && table
            .find("tr")
            .map(|first| NodeKey::of(first) == node.key())
            .unwrap_or(false)
}

fn alignment_marker(align: Option<&str>) -> &'static str {
    match align.map(str::to_ascii_lowercase).as_deref() {
        Some("left") => ":---",
        Some("right") => "---:",
        Some("center") => ":---:",
        _ => "---",
    }
}

/// Blank header row plus divider, sized to the widest row.
fn synthesized_header(columns: usize) -> String {
    if columns == 0 {
        return String::new();
    }

    let mut blank = String::new();
    let mut divider = String::new();
    for i in 0..columns {
        if i == 0 {
            blank.push_str("|  |");
            divider.push_str("| --- |");
        } else {
            blank.push_str("  |");
            divider.push_str(" --- |");
        }
    }

    format!("{blank}\n{divider}\n")
}

fn max_columns(table: &Node) -> usize {
    fn collect(node: &Node, max: &mut usize) {
        for child in node.element_children() {
            if child.tag_name() == "tr" {
                let cells = child
                    .element_children()
                    .filter(|c| matches!(c.tag_name(), "th" | "td"))
                    .count();
                *max = (*max).max(cells);
            } else {
                collect(child, max);
            }
        }
    }

    let mut max = 0;
    collect(table, &mut max);
    max
}

#[cfg(test)]
mod tests {
    use super::*;
    use htmldown::Converter;

    fn converter() -> Converter {
        let mut converter = Converter::new();
        converter.use_plugin(crate::tables);
        converter
    }

    fn cell(tag: &str, text: &str) -> Node {
        let mut node = Node::element(tag);
        node.add_child(Node::text(text));
        node
    }

    fn row(cells: Vec<Node>) -> Node {
        let mut tr = Node::element("tr");
        for cell in cells {
            tr.add_child(cell);
        }
        tr
    }

    #[test]
    fn table_with_thead() {
        let mut thead = Node::element("thead");
        thead.add_child(row(vec![cell("th", "Name"), cell("th", "Age")]));
        let mut tbody = Node::element("tbody");
        tbody.add_child(row(vec![cell("td", "Ada"), cell("td", "36")]));
        let mut table = Node::element("table");
        table.add_child(thead);
        table.add_child(tbody);

        assert_eq!(
            converter().convert(&mut table).unwrap(),
            "| Name | Age |\n| --- | --- |\n| Ada | 36 |"
        );
    }

    #[test]
    fn first_row_with_th_becomes_header() {
        let mut table = Node::element("table");
        table.add_child(row(vec![cell("th", "H")]));
        table.add_child(row(vec![cell("td", "a")]));

        assert_eq!(
            converter().convert(&mut table).unwrap(),
            "| H |\n| --- |\n| a |"
        );
    }

    #[test]
    fn headerless_table_synthesizes_header() {
        let mut table = Node::element("table");
        table.add_child(row(vec![cell("td", "a"), cell("td", "b")]));
        table.add_child(row(vec![cell("td", "c"), cell("td", "d"), cell("td", "e")]));

        assert_eq!(
            converter().convert(&mut table).unwrap(),
            "|  |  |  |\n| --- | --- | --- |\n| a | b |\n| c | d | e |"
        );
    }

    #[test]
    fn alignment_markers_from_align_attribute() {
        let mut right = Node::element_with_attrs("td", vec![("align", "right")]);
        right.add_child(Node::text("9"));
        let mut center = Node::element_with_attrs("th", vec![("align", "center")]);
        center.add_child(Node::text("M"));

        let mut table = Node::element("table");
        table.add_child(row(vec![center, right]));
        table.add_child(row(vec![cell("td", "m"), cell("td", "1")]));

        assert_eq!(
            converter().convert(&mut table).unwrap(),
            "| M | 9 |\n| :---: | ---: |\n| m | 1 |"
        );
    }

    #[test]
    fn cell_content_is_flattened_and_pipes_escaped() {
        let mut td = Node::element("td");
        td.add_child(cell("p", "a | b"));
        td.add_child(cell("p", "second"));

        let mut table = Node::element("table");
        table.add_child(Node::element("thead"));
        table.add_child(row(vec![td]));

        let markdown = converter().convert(&mut table).unwrap();
        assert!(markdown.contains("| a \\| b<br>second |"));
    }

    #[test]
    fn caption_is_hoisted_after_the_table() {
        let mut table = Node::element("table");
        table.add_child(cell("caption", "Stats"));
        table.add_child(row(vec![cell("th", "H")]));
        let mut root = Node::element("div");
        root.add_child(table);

        assert_eq!(
            converter().convert(&mut root).unwrap(),
            "| H |\n| --- |\n\nStats"
        );
    }

    #[test]
    fn empty_table_renders_nothing() {
        let mut table = Node::element("table");
        assert_eq!(converter().convert(&mut table).unwrap(), "");
    }

    #[test]
    fn parsed_table_round_trip() {
        let markdown = converter()
            .convert_html(
                "<table><thead><tr><th>K</th><th>V</th></tr></thead>\
                 <tbody><tr><td>x</td><td>1</td></tr></tbody></table>",
            )
            .unwrap();

        assert_eq!(markdown, "| K | V |\n| --- | --- |\n| x | 1 |");
    }
}
