//! Converter - the main entry point for tree to Markdown conversion.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::lists::{annotate_lists, ListItemMeta};
use crate::node::{Node, NodeKey, NodeRef, NodeType};
use crate::options::Options;
use crate::rules::{Rule, Rules, TextFn};
use crate::utilities::collapse_newline_runs;
use crate::Result;

type BeforeHook = Box<dyn Fn(&mut Node) + Send + Sync>;
type AfterHook = Box<dyn Fn(String) -> String + Send + Sync>;

/// Per-call scratch state, allocated fresh for every [`Converter::convert`].
///
/// Carries the bubbled header/footer fragments and the list-item side
/// table. Advanced rules receive it by `&mut`; because children are reduced
/// before their parent dispatches, child fragments always precede the
/// parent's own.
#[derive(Default)]
pub struct ConvertState {
    header: Vec<String>,
    footer: Vec<String>,
    list_items: HashMap<NodeKey, ListItemMeta>,
}

impl ConvertState {
    /// Bubble a fragment to be spliced above the document body.
    pub fn push_header(&mut self, fragment: String) {
        self.header.push(fragment);
    }

    /// Bubble a fragment to be spliced below the document body.
    pub fn push_footer(&mut self, fragment: String) {
        self.footer.push(fragment);
    }

    /// Number of footer fragments bubbled so far.
    pub fn footer_count(&self) -> usize {
        self.footer.len()
    }

    /// Number of header fragments bubbled so far.
    pub fn header_count(&self) -> usize {
        self.header.len()
    }

    pub(crate) fn insert_list_item(&mut self, key: NodeKey, meta: ListItemMeta) {
        self.list_items.insert(key, meta);
    }

    pub(crate) fn take_list_item(&mut self, key: NodeKey) -> Option<ListItemMeta> {
        self.list_items.remove(&key)
    }
}

/// The main service for converting element trees to Markdown.
///
/// Rules, hooks and options are configured once; the converter is then
/// reusable (and shareable across threads) for any number of `convert`
/// calls on independent trees.
pub struct Converter {
    options: Options,
    rules: Rules,
    before_hooks: Vec<BeforeHook>,
    after_hooks: Vec<AfterHook>,
}

impl Converter {
    /// Create a converter with default options and the CommonMark rules.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Create a converter with custom options.
    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            rules: Rules::new(),
            before_hooks: Vec::new(),
            after_hooks: Vec::new(),
        }
    }

    /// Register rules; they take precedence over the built-in set.
    pub fn add_rules(&mut self, rules: Vec<Rule>) -> &mut Self {
        for rule in rules {
            self.rules.add(rule);
        }
        self
    }

    /// Emit matching elements as their original serialized markup.
    pub fn keep(&mut self, tags: &[&str]) -> &mut Self {
        self.rules.keep(tags);
        self
    }

    /// Drop matching elements together with their whole subtree.
    pub fn remove(&mut self, tags: &[&str]) -> &mut Self {
        self.rules.remove(tags);
        self
    }

    /// Replace the text pseudo-rule.
    pub fn set_text_rule(&mut self, rule: TextFn) -> &mut Self {
        self.rules.set_text_rule(rule);
        self
    }

    /// Register a hook run on the tree before conversion. Hooks may mutate
    /// the structure; they run in registration order.
    pub fn before<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut Node) + Send + Sync + 'static,
    {
        self.before_hooks.push(Box::new(hook));
        self
    }

    /// Register a hook transforming the final Markdown string.
    pub fn after<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        self.after_hooks.push(Box::new(hook));
        self
    }

    /// Apply a plugin.
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Get the current options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Convert a tree to Markdown.
    ///
    /// Takes the root mutably because before-hooks may restructure the
    /// tree. A rule error aborts the whole conversion with no partial
    /// output.
    pub fn convert(&self, root: &mut Node) -> Result<String> {
        debug!("converting document tree");

        for hook in &self.before_hooks {
            hook(root);
        }

        let root: &Node = root;
        let mut state = ConvertState::default();
        annotate_lists(root, &self.options, &mut state);

        let mut ancestors: Vec<&Node> = Vec::new();
        let body = self.reduce(root, &mut ancestors, 0, &mut state)?;

        let mut output = String::with_capacity(body.len() + 64);
        let header = state.header.join("\n");
        if !header.is_empty() {
            output.push_str(&header);
            output.push_str("\n\n");
        }
        output.push_str(&body);
        let footer = state.footer.join("\n");
        if !footer.is_empty() {
            output.push_str("\n\n");
            output.push_str(&footer);
        }

        let mut markdown = collapse_newline_runs(output.trim_matches('\n'));
        for hook in &self.after_hooks {
            markdown = hook(markdown);
        }

        let markdown = markdown.trim().to_string();
        debug!(chars = markdown.len(), "document converted");
        Ok(markdown)
    }

    /// Convert an HTML string to Markdown.
    #[cfg(feature = "html")]
    pub fn convert_html(&self, html: &str) -> Result<String> {
        let mut root = crate::html::parse_html(html);
        self.convert(&mut root)
    }

    /// Depth-first, post-order reduction of one node.
    fn reduce<'a>(
        &self,
        node: &'a Node,
        ancestors: &mut Vec<&'a Node>,
        index: usize,
        state: &mut ConvertState,
    ) -> Result<String> {
        match node.node_type {
            NodeType::Text => {
                let text = node.value.as_deref().unwrap_or("");
                Ok(self.rules.apply_text(text, &self.options))
            }
            NodeType::Comment => Ok(String::new()),
            NodeType::Element => {
                let tag = node.tag_name();

                // removal skips the subtree before children are visited
                if self.rules.is_removed(tag) {
                    trace!(tag, "removing subtree");
                    return Ok(String::new());
                }
                if self.rules.is_kept(tag) {
                    trace!(tag, "keeping original markup");
                    return Ok(node.outer_html());
                }

                let mut content = String::new();
                ancestors.push(node);
                for (i, child) in node.children.iter().enumerate() {
                    let reduced = self.reduce(child, ancestors, i, state)?;
                    content.push_str(&reduced);
                }
                ancestors.pop();

                let node_ref = NodeRef::new(node, ancestors.as_slice(), index);
                self.rules
                    .dispatch(tag, &content, &node_ref, &self.options, state)
            }
        }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}
