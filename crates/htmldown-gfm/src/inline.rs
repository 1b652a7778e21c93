//! Strikethrough and task list rules.

use htmldown::{add_space_if_necessary, delimiter_for_every_line, Rule};

pub(crate) fn strikethrough_rules() -> Vec<Rule> {
    vec![Rule::simple(&["del", "s", "strike"], |content, node, _| {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Some(String::new()));
        }

        let text = delimiter_for_every_line(trimmed, "~~");
        Ok(Some(add_space_if_necessary(node, text)))
    })]
}

pub(crate) fn task_list_rules() -> Vec<Rule> {
    vec![Rule::simple(&["input"], |_, node, _| {
        if node.parent_tag() != Some("li") || node.attr("type") != Some("checkbox") {
            return Ok(None);
        }

        Ok(Some(if node.has_attr("checked") {
            "[x] ".to_string()
        } else {
            "[ ] ".to_string()
        }))
    })]
}

#[cfg(test)]
mod tests {
    use htmldown::{Converter, Node};

    fn converter() -> Converter {
        let mut converter = Converter::new();
        converter.use_plugin(crate::plugin);
        converter
    }

    #[test]
    fn strikethrough_wraps_content() {
        let mut del = Node::element("del");
        del.add_child(Node::text("gone"));

        assert_eq!(converter().convert(&mut del).unwrap(), "~~gone~~");
    }

    #[test]
    fn empty_strikethrough_suppressed() {
        let mut root = Node::element("div");
        root.add_child(Node::element("s"));
        let mut p = Node::element("p");
        p.add_child(Node::text("after"));
        root.add_child(p);

        assert_eq!(converter().convert(&mut root).unwrap(), "after");
    }

    #[test]
    fn strikethrough_per_line() {
        let mut del = Node::element("del");
        del.add_child(Node::text("one"));
        del.add_child(Node::element("br"));
        del.add_child(Node::text("two"));

        assert_eq!(converter().convert(&mut del).unwrap(), "~~one~~\n\n~~two~~");
    }

    #[test]
    fn task_list_items_render_checkboxes() {
        let mut done = Node::element("li");
        done.add_child(Node::element_with_attrs(
            "input",
            vec![("type", "checkbox"), ("checked", "")],
        ));
        done.add_child(Node::text("Ship it"));

        let mut open = Node::element("li");
        open.add_child(Node::element_with_attrs("input", vec![("type", "checkbox")]));
        open.add_child(Node::text("Write docs"));

        let mut ul = Node::element("ul");
        ul.add_child(done);
        ul.add_child(open);

        assert_eq!(
            converter().convert(&mut ul).unwrap(),
            "- [x] Ship it\n- [ ] Write docs"
        );
    }

    #[test]
    fn non_checkbox_input_ignored() {
        let mut li = Node::element("li");
        li.add_child(Node::element_with_attrs("input", vec![("type", "text")]));
        li.add_child(Node::text("plain"));
        let mut ul = Node::element("ul");
        ul.add_child(li);

        assert_eq!(converter().convert(&mut ul).unwrap(), "- plain");
    }
}
