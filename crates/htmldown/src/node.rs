//! Element/text tree consumed by the converter.
//!
//! The engine does not parse HTML itself. Any parser can build this tree
//! (the optional `html` feature ships a scraper-backed adapter) and hand it
//! to [`crate::Converter::convert`].

/// Node kinds the converter distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Comment,
}

/// An owned node in the input tree.
///
/// Elements carry a lowercase tag name, ordered attributes and children;
/// text nodes carry only their content. Parent links are not stored; the
/// walker supplies ancestry through [`NodeRef`].
#[derive(Debug, Clone)]
pub struct Node {
    /// Node kind
    pub node_type: NodeType,

    /// Lowercase tag name for elements, `"#text"` / `"#comment"` otherwise
    pub name: String,

    /// Text content for text and comment nodes
    pub value: Option<String>,

    /// Attributes as ordered `(name, value)` pairs
    pub attributes: Vec<(String, String)>,

    /// Child nodes in document order
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new element node.
    pub fn element(tag_name: &str) -> Self {
        Self {
            node_type: NodeType::Element,
            name: tag_name.to_lowercase(),
            value: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a new element node with attributes.
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        Self {
            node_type: NodeType::Element,
            name: tag_name.to_lowercase(),
            value: None,
            attributes: attrs
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect(),
            children: Vec::new(),
        }
    }

    /// Create a new text node.
    pub fn text(content: &str) -> Self {
        Self {
            node_type: NodeType::Text,
            name: "#text".to_string(),
            value: Some(content.to_string()),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a container node for document fragments.
    pub fn fragment() -> Self {
        Self::element("div")
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Lowercase tag name.
    pub fn tag_name(&self) -> &str {
        &self.name
    }

    /// Get an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.attributes
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing an existing value.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let name = name.to_lowercase();
        if let Some(entry) = self.attributes.iter_mut().find(|(k, _)| *k == name) {
            entry.1 = value.to_string();
        } else {
            self.attributes.push((name, value.to_string()));
        }
    }

    /// All child nodes.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter()
    }

    /// Only element children.
    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(|n| n.is_element())
    }

    /// Append a child node.
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// First descendant element with the given tag, depth-first.
    pub fn find(&self, tag: &str) -> Option<&Node> {
        for child in &self.children {
            if child.is_element() && child.name == tag {
                return Some(child);
            }
            if let Some(found) = child.find(tag) {
                return Some(found);
            }
        }
        None
    }

    /// Whether any descendant element has the given tag.
    pub fn has_descendant(&self, tag: &str) -> bool {
        self.find(tag).is_some()
    }

    /// All text content from this node and its descendants.
    pub fn text_content(&self) -> String {
        match self.node_type {
            NodeType::Text => self.value.clone().unwrap_or_default(),
            NodeType::Comment => String::new(),
            NodeType::Element => self.children().map(Node::text_content).collect(),
        }
    }

    /// Reconstruct outer HTML (for keep rules).
    pub fn outer_html(&self) -> String {
        match self.node_type {
            NodeType::Text => self.value.clone().unwrap_or_default(),
            NodeType::Comment => String::new(),
            NodeType::Element => {
                let tag = self.tag_name();
                let attrs = self.attributes_string();

                if crate::utilities::is_void(tag) {
                    if attrs.is_empty() {
                        format!("<{tag}>")
                    } else {
                        format!("<{tag} {attrs}>")
                    }
                } else {
                    let inner = self.inner_html();
                    if attrs.is_empty() {
                        format!("<{tag}>{inner}</{tag}>")
                    } else {
                        format!("<{tag} {attrs}>{inner}</{tag}>")
                    }
                }
            }
        }
    }

    /// Reconstruct inner HTML.
    pub fn inner_html(&self) -> String {
        self.children().map(Node::outer_html).collect()
    }

    fn attributes_string(&self) -> String {
        self.attributes
            .iter()
            .map(|(name, value)| {
                if value.is_empty() {
                    name.clone()
                } else {
                    format!("{}=\"{}\"", name, escape_html_attr(value))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Escape an HTML attribute value.
fn escape_html_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Identity of a node within one conversion call.
///
/// Derived from the node's address; stable because the tree is not mutated
/// between the list pre-pass and the reduction that consumes the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(usize);

impl NodeKey {
    pub fn of(node: &Node) -> Self {
        Self(node as *const Node as usize)
    }
}

/// A node together with its position in the walk.
///
/// Rules receive a `NodeRef` instead of a bare [`Node`] so they can query
/// ancestry and siblings without the tree storing parent pointers.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    node: &'a Node,
    ancestors: &'a [&'a Node],
    index: usize,
}

impl<'a> NodeRef<'a> {
    /// Create a reference for `node`, whose ancestors (root first) are on
    /// `ancestors` and which sits at `index` among its parent's children.
    pub fn new(node: &'a Node, ancestors: &'a [&'a Node], index: usize) -> Self {
        Self {
            node,
            ancestors,
            index,
        }
    }

    /// The node itself.
    pub fn node(&self) -> &'a Node {
        self.node
    }

    /// Identity key for per-call side tables.
    pub fn key(&self) -> NodeKey {
        NodeKey::of(self.node)
    }

    pub fn tag_name(&self) -> &str {
        self.node.tag_name()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.node.attr(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.node.has_attr(name)
    }

    pub fn children(&self) -> impl Iterator<Item = &'a Node> {
        self.node.children.iter()
    }

    pub fn element_children(&self) -> impl Iterator<Item = &'a Node> {
        self.node.children.iter().filter(|n| n.is_element())
    }

    pub fn text_content(&self) -> String {
        self.node.text_content()
    }

    pub fn outer_html(&self) -> String {
        self.node.outer_html()
    }

    /// The immediate parent, if any.
    pub fn parent(&self) -> Option<&'a Node> {
        self.ancestors.last().copied()
    }

    /// Lowercase tag of the immediate parent.
    pub fn parent_tag(&self) -> Option<&'a str> {
        self.parent().map(Node::tag_name)
    }

    /// Whether any ancestor has one of the given tags.
    pub fn is_within(&self, tags: &[&str]) -> bool {
        self.ancestors
            .iter()
            .any(|a| tags.contains(&a.tag_name()))
    }

    /// The nearest ancestor with the given tag.
    pub fn closest(&self, tag: &str) -> Option<&'a Node> {
        self.ancestors
            .iter()
            .rev()
            .copied()
            .find(|a| a.tag_name() == tag)
    }

    /// The sibling immediately before this node, of any kind.
    pub fn prev_sibling(&self) -> Option<&'a Node> {
        let parent = self.parent()?;
        self.index.checked_sub(1).and_then(|i| parent.children.get(i))
    }

    /// The sibling immediately after this node, of any kind.
    pub fn next_sibling(&self) -> Option<&'a Node> {
        self.parent()?.children.get(self.index + 1)
    }

    /// Position among the parent's *element* children.
    pub fn element_index(&self) -> usize {
        match self.parent() {
            Some(parent) => parent.children[..self.index]
                .iter()
                .filter(|n| n.is_element())
                .count(),
            None => 0,
        }
    }

    /// Whether this is the last element child of its parent.
    pub fn is_last_element_child(&self) -> bool {
        match self.parent() {
            Some(parent) => parent.children[self.index + 1..]
                .iter()
                .all(|n| !n.is_element()),
            None => true,
        }
    }
}
