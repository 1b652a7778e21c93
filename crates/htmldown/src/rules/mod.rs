//! Rule registry and dispatch.

mod commonmark;
mod rule;

pub use commonmark::commonmark_rules;
pub use rule::{AdvancedFn, Replacement, Rule, SimpleFn};

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::node::NodeRef;
use crate::options::Options;
use crate::service::ConvertState;
use crate::Result;

/// Pseudo-rule applied to text nodes.
pub type TextFn = Box<dyn Fn(&str, &Options) -> String + Send + Sync>;

/// Tag-keyed registry of conversion rules.
///
/// Rules registered after construction (custom rules and plugins) are
/// consulted before the built-in CommonMark tier, so extensions override
/// baseline behavior. Within a tier, registration order decides.
pub struct Rules {
    /// Rules added through `add` (checked first)
    custom: IndexMap<String, Vec<Arc<Rule>>>,
    /// Built-in CommonMark rules
    builtin: IndexMap<String, Vec<Arc<Rule>>>,
    /// Tags kept as serialized HTML
    kept: IndexSet<String>,
    /// Tags removed together with their subtree
    removed: IndexSet<String>,
    /// Text node handling
    text: Option<TextFn>,
}

impl Rules {
    /// Create a registry seeded with the CommonMark rules.
    pub fn new() -> Self {
        let mut rules = Self {
            custom: IndexMap::new(),
            builtin: IndexMap::new(),
            kept: IndexSet::new(),
            removed: IndexSet::new(),
            text: Some(Box::new(commonmark::convert_text)),
        };

        for rule in commonmark_rules() {
            let rule = Arc::new(rule);
            for tag in &rule.tags {
                rules
                    .builtin
                    .entry(tag.clone())
                    .or_default()
                    .push(Arc::clone(&rule));
            }
        }

        // scripting payloads never belong in the output
        rules.removed.insert("script".to_string());
        rules.removed.insert("style".to_string());

        rules
    }

    /// Register a rule under every tag it declares.
    pub fn add(&mut self, rule: Rule) {
        let rule = Arc::new(rule);
        for tag in &rule.tags {
            self.custom
                .entry(tag.clone())
                .or_default()
                .push(Arc::clone(&rule));
        }
    }

    /// Mark tags to be emitted as their original serialized markup.
    pub fn keep(&mut self, tags: &[&str]) {
        for tag in tags {
            self.kept.insert(tag.to_lowercase());
        }
    }

    /// Mark tags whose whole subtree is dropped.
    pub fn remove(&mut self, tags: &[&str]) {
        for tag in tags {
            self.removed.insert(tag.to_lowercase());
        }
    }

    /// Replace the text pseudo-rule.
    pub fn set_text_rule(&mut self, rule: TextFn) {
        self.text = Some(rule);
    }

    pub fn is_kept(&self, tag: &str) -> bool {
        self.kept.contains(tag)
    }

    pub fn is_removed(&self, tag: &str) -> bool {
        self.removed.contains(tag)
    }

    /// Convert a text node's content.
    pub fn apply_text(&self, text: &str, options: &Options) -> String {
        match &self.text {
            Some(rule) => rule(text, options),
            None => text.to_string(),
        }
    }

    /// Dispatch an element: first non-`None` result in registration order
    /// wins, custom tier before built-in; no match falls back to
    /// passthrough of the reduced child content.
    pub fn dispatch(
        &self,
        tag: &str,
        content: &str,
        node: &NodeRef<'_>,
        options: &Options,
        state: &mut ConvertState,
    ) -> Result<String> {
        let custom = self.custom.get(tag).into_iter().flatten();
        let builtin = self.builtin.get(tag).into_iter().flatten();

        for rule in custom.chain(builtin) {
            if let Some(markdown) = rule.replace(content, node, options, state)? {
                return Ok(markdown);
            }
        }

        Ok(content.to_string())
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}
