//! Rule types for HTML to Markdown conversion.

use crate::node::NodeRef;
use crate::options::Options;
use crate::service::ConvertState;
use crate::Result;

/// Replacement signature for simple rules.
///
/// Receives the already-converted child Markdown, the element and the
/// conversion options. `Ok(None)` declines, letting the next rule (or the
/// passthrough fallback) handle the element.
pub type SimpleFn =
    Box<dyn Fn(&str, &NodeRef<'_>, &Options) -> Result<Option<String>> + Send + Sync>;

/// Replacement signature for advanced rules, which additionally receive the
/// per-call [`ConvertState`] to bubble header/footer fragments or consume
/// side-table annotations.
pub type AdvancedFn = Box<
    dyn Fn(&str, &NodeRef<'_>, &Options, &mut ConvertState) -> Result<Option<String>>
        + Send
        + Sync,
>;

/// The two replacement capabilities a rule can carry.
pub enum Replacement {
    Simple(SimpleFn),
    Advanced(AdvancedFn),
}

/// A rule converts elements of its declared tags to Markdown.
pub struct Rule {
    /// Tags this rule applies to
    pub tags: Vec<String>,
    /// Replacement producing the Markdown
    pub replacement: Replacement,
}

impl Rule {
    /// Create a simple rule for the given tags.
    pub fn simple<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&str, &NodeRef<'_>, &Options) -> Result<Option<String>> + Send + Sync + 'static,
    {
        Self {
            tags: tags.iter().map(|t| t.to_lowercase()).collect(),
            replacement: Replacement::Simple(Box::new(replacement)),
        }
    }

    /// Create an advanced rule for the given tags.
    pub fn advanced<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&str, &NodeRef<'_>, &Options, &mut ConvertState) -> Result<Option<String>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            tags: tags.iter().map(|t| t.to_lowercase()).collect(),
            replacement: Replacement::Advanced(Box::new(replacement)),
        }
    }

    /// Apply this rule's replacement.
    pub fn replace(
        &self,
        content: &str,
        node: &NodeRef<'_>,
        options: &Options,
        state: &mut ConvertState,
    ) -> Result<Option<String>> {
        match &self.replacement {
            Replacement::Simple(f) => f(content, node, options),
            Replacement::Advanced(f) => f(content, node, options, state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn tags_are_lowercased() {
        let rule = Rule::simple(&["EM", "i"], |content, _, _| Ok(Some(content.to_string())));
        assert_eq!(rule.tags, vec!["em", "i"]);
    }

    #[test]
    fn simple_rule_applies() {
        let rule = Rule::simple(&["p"], |content, _, _| Ok(Some(format!("<<{content}>>"))));
        let node = Node::element("p");
        let node_ref = NodeRef::new(&node, &[], 0);
        let mut state = ConvertState::default();

        let result = rule
            .replace("body", &node_ref, &Options::default(), &mut state)
            .unwrap();
        assert_eq!(result, Some("<<body>>".to_string()));
    }

    #[test]
    fn advanced_rule_reaches_state() {
        let rule = Rule::advanced(&["a"], |content, _, _, state| {
            state.push_footer("[1]: x".to_string());
            Ok(Some(content.to_string()))
        });
        let node = Node::element("a");
        let node_ref = NodeRef::new(&node, &[], 0);
        let mut state = ConvertState::default();

        rule.replace("text", &node_ref, &Options::default(), &mut state)
            .unwrap();
        assert_eq!(state.footer_count(), 1);
    }
}
