//! String helpers and element tables shared by the rules.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::node::NodeRef;

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas",
    "center", "dd", "dir", "div", "dl", "dt", "fieldset", "figcaption",
    "figure", "footer", "form", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "html", "isindex", "li", "main", "menu",
    "nav", "noframes", "noscript", "ol", "output", "p", "pre", "section",
    "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Void (self-closing) HTML elements
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Inline HTML elements
pub const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "acronym", "b", "bdo", "big", "br", "button", "cite",
    "code", "dfn", "em", "i", "img", "input", "kbd", "label", "map",
    "object", "output", "q", "samp", "select", "small", "span", "strong",
    "sub", "sup", "textarea", "time", "tt", "var",
];

/// Check if a tag is a block-level element
pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag)
}

/// Check if a tag is a void element
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Check if a tag is an inline element
pub fn is_inline(tag: &str) -> bool {
    INLINE_ELEMENTS.contains(&tag)
}

/// Collapse runs of whitespace into single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_whitespace = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_was_whitespace {
                result.push(' ');
                prev_was_whitespace = true;
            }
        } else {
            result.push(c);
            prev_was_whitespace = false;
        }
    }

    result
}

/// Backslash-escape characters that would otherwise be read as Markdown.
pub fn escape_markdown_characters(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '#' | '+' | '-' | '!' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    result
}

/// Escape `#` characters that are not escaped yet.
pub fn escape_hashes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev = '\0';

    for c in text.chars() {
        if c == '#' && prev != '\\' {
            result.push('\\');
        }
        result.push(c);
        prev = c;
    }

    result
}

/// Longest contiguous run of `ch` in `content`.
pub fn longest_run(ch: char, content: &str) -> usize {
    let mut max = 0;
    let mut current = 0;

    for c in content.chars() {
        if c == ch {
            current += 1;
            max = max.max(current);
        } else {
            current = 0;
        }
    }

    max
}

/// Fence for a code block containing `content`.
///
/// The fence must be longer than any run of the fence character inside the
/// block and at least three characters; an undersized fence truncates the
/// block at the first collision.
pub fn calculate_code_fence(ch: char, content: &str) -> String {
    let width = (longest_run(ch, content) + 1).max(3);
    ch.to_string().repeat(width)
}

static BLANK_GAPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").expect("valid regex"));
static NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Make multi-line content safe inside a link label: collapse blank-line
/// gaps and trim each line.
pub fn escape_multi_line(content: &str) -> String {
    let content = content.trim();
    let content = BLANK_GAPS.replace_all(content, "\n");

    content
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap each non-empty line of `content` in `delimiter` separately, so an
/// emphasis marker never spans a line break.
pub fn delimiter_for_every_line(content: &str, delimiter: &str) -> String {
    content
        .lines()
        .map(|line| {
            let line = line.trim();
            if line.is_empty() {
                String::new()
            } else {
                format!("{delimiter}{line}{delimiter}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse runs of three or more newlines down to a blank line.
pub fn collapse_newline_runs(s: &str) -> String {
    NEWLINE_RUNS.replace_all(s, "\n\n").into_owned()
}

/// Add a boundary space when a text sibling would otherwise fuse with a
/// Markdown delimiter (`x<b>y</b>` must not become `x**y**`).
pub fn add_space_if_necessary(node: &NodeRef<'_>, markdown: String) -> String {
    let mut markdown = markdown;

    if let Some(prev) = node.prev_sibling() {
        if prev.is_text() {
            if let Some(last) = prev.text_content().chars().next_back() {
                if !last.is_whitespace() {
                    markdown.insert(0, ' ');
                }
            }
        }
    }

    if let Some(next) = node.next_sibling() {
        if next.is_text() {
            if let Some(first) = next.text_content().chars().next() {
                if !first.is_whitespace() && !first.is_ascii_punctuation() {
                    markdown.push(' ');
                }
            }
        }
    }

    markdown
}

/// Strip leading indentation from every line, leaving list items and
/// 4-space code indentation alone.
pub fn trim_leading_spaces(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            let mut spaces = 0;
            for (i, c) in line.char_indices() {
                if c == ' ' {
                    spaces += 1;
                    continue;
                }
                if c == '\t' {
                    spaces += 4;
                    continue;
                }
                // list item or indented code, leave as-is
                if matches!(c, '-' | '*' | '+') || spaces >= 4 {
                    return line.to_string();
                }
                return line[i..].to_string();
            }
            String::new()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trim an attribute value, treating a missing attribute as empty.
pub fn clean_attribute(value: Option<&str>) -> String {
    value
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Resolve `raw` against `domain` when it is relative. Absolute URLs
/// (including `data:`) and anything unparseable pass through unchanged.
pub fn absolute_url(domain: Option<&str>, raw: &str) -> String {
    let Some(domain) = domain else {
        return raw.to_string();
    };

    match Url::parse(raw) {
        Ok(_) => raw.to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = if domain.contains("://") {
                domain.to_string()
            } else {
                format!("https://{domain}")
            };
            Url::parse(&base)
                .and_then(|base| base.join(raw))
                .map(|resolved| resolved.to_string())
                .unwrap_or_else(|_| raw.to_string())
        }
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn escape_characters() {
        assert_eq!(escape_markdown_characters("*test*"), "\\*test\\*");
        assert_eq!(escape_markdown_characters("_test_"), "\\_test\\_");
        assert_eq!(escape_markdown_characters("[link]"), "\\[link\\]");
        assert_eq!(escape_markdown_characters("normal"), "normal");
    }

    #[test]
    fn escape_hashes_skips_escaped() {
        assert_eq!(escape_hashes("a # b"), "a \\# b");
        assert_eq!(escape_hashes("a \\# b"), "a \\# b");
        assert_eq!(escape_hashes("##"), "\\#\\#");
    }

    #[test]
    fn fence_exceeds_inner_runs() {
        assert_eq!(calculate_code_fence('`', "no ticks"), "```");
        assert_eq!(calculate_code_fence('`', "a `` b"), "```");
        assert_eq!(calculate_code_fence('`', "````"), "`````");
        assert_eq!(calculate_code_fence('~', "~~~~"), "~~~~~");
    }

    #[test]
    fn longest_run_scans_once() {
        assert_eq!(longest_run('`', ""), 0);
        assert_eq!(longest_run('`', "a`b``c`"), 2);
    }

    #[test]
    fn delimiter_per_line() {
        assert_eq!(delimiter_for_every_line("one", "**"), "**one**");
        assert_eq!(
            delimiter_for_every_line("one\ntwo", "_"),
            "_one_\n_two_"
        );
        assert_eq!(delimiter_for_every_line("one\n\ntwo", "*"), "*one*\n\n*two*");
    }

    #[test]
    fn multi_line_link_text() {
        assert_eq!(escape_multi_line("  a  \n\n\n  b  "), "a\nb");
    }

    #[test]
    fn boundary_spaces() {
        let mut p = Node::element("p");
        p.add_child(Node::text("x"));
        p.add_child(Node::element("b"));
        p.add_child(Node::text("z"));

        let ancestors = [&p];
        let b = NodeRef::new(&p.children[1], &ancestors, 1);
        assert_eq!(add_space_if_necessary(&b, "**y**".to_string()), " **y** ");
    }

    #[test]
    fn boundary_space_skips_punctuation() {
        let mut p = Node::element("p");
        p.add_child(Node::text("see "));
        p.add_child(Node::element("b"));
        p.add_child(Node::text("."));

        let ancestors = [&p];
        let b = NodeRef::new(&p.children[1], &ancestors, 1);
        assert_eq!(add_space_if_necessary(&b, "**y**".to_string()), "**y**");
    }

    #[test]
    fn leading_space_trim_preserves_structure() {
        assert_eq!(trim_leading_spaces("  hello\n    code"), "hello\n    code");
        assert_eq!(trim_leading_spaces("  - item"), "  - item");
    }

    #[test]
    fn url_resolution() {
        assert_eq!(
            absolute_url(Some("example.com"), "/page"),
            "https://example.com/page"
        );
        assert_eq!(
            absolute_url(Some("https://example.com/sub/"), "page"),
            "https://example.com/sub/page"
        );
        assert_eq!(
            absolute_url(Some("example.com"), "https://other.org/x"),
            "https://other.org/x"
        );
        assert_eq!(
            absolute_url(Some("example.com"), "data:text/plain,hi"),
            "data:text/plain,hi"
        );
        assert_eq!(absolute_url(None, "/page"), "/page");
    }

    #[test]
    fn newline_run_collapse() {
        assert_eq!(collapse_newline_runs("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_newline_runs("a\n\nb"), "a\n\nb");
    }
}
