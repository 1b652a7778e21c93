//! Configuration for a conversion.

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    /// ATX-style headings (prefixed with #)
    #[default]
    Atx,
    /// Setext-style headings (underlined with = or -)
    /// Only used for h1 and h2, falls back to ATX for h3-h6
    Setext,
}

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeBlockStyle {
    /// Fenced code blocks (``` or ~~~)
    #[default]
    Fenced,
    /// Indented code blocks (4 spaces)
    Indented,
}

/// Link style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStyle {
    /// Inline links [text](url)
    #[default]
    Inlined,
    /// Reference links [text][n] with definitions collected below the body
    Referenced,
}

/// Reference style for referenced links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkReferenceStyle {
    /// Full reference: [text][1]
    #[default]
    Full,
    /// Collapsed reference: [text][]
    Collapsed,
    /// Shortcut reference: [text]
    Shortcut,
}

/// Escaping of Markdown characters in text nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeMode {
    /// Backslash-escape characters that would be read as Markdown
    #[default]
    Basic,
    /// Pass text through untouched
    Disabled,
}

/// Options for a [`crate::Converter`].
///
/// Shared read-only across all rules during one conversion. Every field
/// defaults independently; enums make invalid values unrepresentable.
#[derive(Debug, Clone)]
pub struct Options {
    /// Heading style (atx or setext)
    pub heading_style: HeadingStyle,

    /// Horizontal rule string
    pub horizontal_rule: String,

    /// Bullet list marker (-, + or *)
    pub bullet_list_marker: char,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Fence token for fenced code blocks (``` or ~~~)
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: String,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Link style
    pub link_style: LinkStyle,

    /// Reference style for referenced links
    pub link_reference_style: LinkReferenceStyle,

    /// Escaping applied to text nodes
    pub escape_mode: EscapeMode,

    /// Base domain for resolving relative URLs. When `None`, relative URLs
    /// pass through unchanged.
    pub domain: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Atx,
            horizontal_rule: "* * *".to_string(),
            bullet_list_marker: '-',
            code_block_style: CodeBlockStyle::Fenced,
            fence: "```".to_string(),
            em_delimiter: "_".to_string(),
            strong_delimiter: "**".to_string(),
            link_style: LinkStyle::Inlined,
            link_reference_style: LinkReferenceStyle::Full,
            escape_mode: EscapeMode::Basic,
            domain: None,
        }
    }
}

impl Options {
    /// First character of the configured fence token.
    pub fn fence_char(&self) -> char {
        self.fence.chars().next().unwrap_or('`')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = Options::default();
        assert_eq!(options.heading_style, HeadingStyle::Atx);
        assert_eq!(options.bullet_list_marker, '-');
        assert_eq!(options.fence_char(), '`');
        assert!(options.domain.is_none());
    }

    #[test]
    fn fence_char_tilde() {
        let options = Options {
            fence: "~~~".to_string(),
            ..Default::default()
        };
        assert_eq!(options.fence_char(), '~');
    }
}
