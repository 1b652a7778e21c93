//! CommonMark rules for HTML to Markdown conversion.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Rule;
use crate::lists::{indent_continuation_lines, ListItemMeta};
use crate::node::Node;
use crate::options::{CodeBlockStyle, EscapeMode, HeadingStyle, LinkReferenceStyle, LinkStyle, Options};
use crate::utilities::{
    absolute_url, add_space_if_necessary, calculate_code_fence, clean_attribute,
    collapse_newline_runs, collapse_whitespace, delimiter_for_every_line, escape_hashes,
    escape_markdown_characters, escape_multi_line, is_inline, longest_run, trim_leading_spaces,
};

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Create all CommonMark rules
pub fn commonmark_rules() -> Vec<Rule> {
    vec![
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        list_item_rule(),
        code_rule(),
        pre_rule(),
        horizontal_rule(),
        image_rule(),
        link_rule(),
        emphasis_rule(),
        strong_rule(),
        noscript_rule(),
        iframe_rule(),
        figure_rule(),
        figcaption_rule(),
    ]
}

/// Convert a text node's content: inter-tag formatting whitespace is
/// dropped, everything else is collapsed and escaped per escape mode.
pub(crate) fn convert_text(text: &str, options: &Options) -> String {
    if text.trim().is_empty() {
        return if text.is_empty() || text.contains('\n') {
            String::new()
        } else {
            " ".to_string()
        };
    }

    let collapsed = collapse_whitespace(text);
    match options.escape_mode {
        EscapeMode::Basic => escape_markdown_characters(&collapsed),
        EscapeMode::Disabled => collapsed,
    }
}

fn paragraph_rule() -> Rule {
    Rule::simple(&["p", "div"], |content, node, _| {
        let minimal = node
            .parent_tag()
            .map(|tag| is_inline(tag) || tag == "li")
            .unwrap_or(false);

        if minimal {
            Ok(Some(format!("\n{content}\n")))
        } else {
            Ok(Some(format!("\n\n{}\n\n", trim_leading_spaces(content))))
        }
    })
}

fn line_break_rule() -> Rule {
    // a blank-line break keeps the separation visible in any context
    Rule::simple(&["br"], |_, _, _| Ok(Some("\n\n".to_string())))
}

fn heading_rule() -> Rule {
    Rule::simple(HEADING_TAGS, |content, node, options| {
        let content = content.replace(['\n', '\r'], " ");
        let content = escape_hashes(&content);
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        // no headings inside links, degrade to bold
        if node.is_within(&["a"]) {
            let delimiter = &options.strong_delimiter;
            return Ok(Some(format!("{delimiter}{content}{delimiter}")));
        }

        let level: usize = node.tag_name()[1..].parse().unwrap_or(1);

        match options.heading_style {
            HeadingStyle::Setext if level <= 2 => {
                let underline = if level == 1 { "=" } else { "-" };
                let underline = underline.repeat(content.chars().count());
                Ok(Some(format!("\n\n{content}\n{underline}\n\n")))
            }
            _ => {
                let prefix = "#".repeat(level);
                Ok(Some(format!("\n\n{prefix} {content}\n\n")))
            }
        }
    })
}

fn blockquote_rule() -> Rule {
    Rule::simple(&["blockquote"], |content, _, _| {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        let content = collapse_newline_runs(content);
        let quoted = content
            .lines()
            .map(|line| format!("> {line}"))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Some(format!("\n\n{quoted}\n\n")))
    })
}

fn list_rule() -> Rule {
    Rule::simple(&["ul", "ol"], |content, node, _| {
        let nested = node
            .parent_tag()
            .map(|tag| matches!(tag, "li" | "ul" | "ol"))
            .unwrap_or(false);

        if nested && node.is_last_element_child() {
            // continues the parent item's block
            Ok(Some(format!("\n{}", content.trim_end())))
        } else {
            Ok(Some(format!("\n\n{content}\n\n")))
        }
    })
}

fn list_item_rule() -> Rule {
    Rule::advanced(&["li"], |content, node, options, state| {
        if content.trim().is_empty() {
            return Ok(Some(String::new()));
        }

        let meta = state.take_list_item(node.key()).unwrap_or_else(|| {
            let marker = format!("{} ", options.bullet_list_marker);
            let marker_width = marker.chars().count();
            ListItemMeta {
                marker,
                marker_width,
                indent: 0,
            }
        });

        let content = content.trim_start_matches('\n').trim_end_matches('\n');
        let content =
            indent_continuation_lines(content, meta.indent + meta.marker_width, options);
        let indent = " ".repeat(meta.indent);

        Ok(Some(format!("{indent}{}{content}\n", meta.marker)))
    })
}

static EMBEDDED_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").expect("valid regex"));

fn code_rule() -> Rule {
    Rule::simple(&["code", "kbd", "samp", "tt"], |_, node, _| {
        // code inside <pre> belongs to the code block rule
        if node.is_within(&["pre"]) {
            return Ok(None);
        }

        let code = node.text_content();
        if code.is_empty() {
            return Ok(Some(String::new()));
        }

        let code = EMBEDDED_NEWLINES.replace_all(&code, "\n");
        let delimiter = "`".repeat(longest_run('`', &code) + 1);

        let spaced = if code.starts_with('`') || code.ends_with('`') {
            format!("{delimiter} {code} {delimiter}")
        } else {
            format!("{delimiter}{code}{delimiter}")
        };

        Ok(Some(spaced))
    })
}

fn pre_rule() -> Rule {
    Rule::simple(&["pre"], |_, node, options| {
        let code_element = node.node().find("code");
        let code = code_element
            .map(Node::text_content)
            .unwrap_or_else(|| node.text_content());
        let code = code.trim_end_matches('\n');

        match options.code_block_style {
            CodeBlockStyle::Indented => {
                let indented = code
                    .lines()
                    .map(|line| format!("    {line}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(Some(format!("\n\n{indented}\n\n")))
            }
            CodeBlockStyle::Fenced => {
                let language = code_element
                    .and_then(|c| c.attr("class"))
                    .and_then(|class| {
                        class
                            .split_whitespace()
                            .find(|token| token.starts_with("language-"))
                    })
                    .map(|token| &token["language-".len()..])
                    .unwrap_or("");

                let fence = calculate_code_fence(options.fence_char(), code);
                Ok(Some(format!("\n\n{fence}{language}\n{code}\n{fence}\n\n")))
            }
        }
    })
}

fn horizontal_rule() -> Rule {
    Rule::simple(&["hr"], |_, node, options| {
        // a divider inside a heading is decorative
        if node.is_within(HEADING_TAGS) {
            return Ok(Some(String::new()));
        }
        Ok(Some(format!("\n\n{}\n\n", options.horizontal_rule)))
    })
}

fn image_rule() -> Rule {
    Rule::simple(&["img"], |_, node, options| {
        let src = clean_attribute(node.attr("src"));
        if src.is_empty() {
            return Ok(Some(String::new()));
        }

        let src = absolute_url(options.domain.as_deref(), &src);
        let alt = collapse_whitespace(&clean_attribute(node.attr("alt")));

        Ok(Some(format!("![{alt}]({src})")))
    })
}

fn link_rule() -> Rule {
    Rule::advanced(&["a"], |content, node, options, state| {
        let href = clean_attribute(node.attr("href"));
        if href.is_empty() || href == "#" {
            return Ok(Some(content.to_string()));
        }

        let href = absolute_url(options.domain.as_deref(), &href);

        let mut text = escape_multi_line(content);
        if text.trim().is_empty() {
            // invisible link content (e.g. an svg), try the attributes
            text = clean_attribute(node.attr("title"));
            if text.is_empty() {
                text = clean_attribute(node.attr("aria-label"));
            }
        }
        if text.is_empty() {
            return Ok(Some(String::new()));
        }

        let title = node
            .attr("title")
            .map(|t| format!(" \"{}\"", collapse_whitespace(t.trim())))
            .unwrap_or_default();

        match options.link_style {
            LinkStyle::Inlined => {
                let markdown = format!("[{text}]({href}{title})");
                Ok(Some(add_space_if_necessary(node, markdown)))
            }
            LinkStyle::Referenced => {
                let (markdown, reference) = match options.link_reference_style {
                    LinkReferenceStyle::Full => {
                        let index = state.footer_count() + 1;
                        (
                            format!("[{text}][{index}]"),
                            format!("[{index}]: {href}{title}"),
                        )
                    }
                    LinkReferenceStyle::Collapsed => (
                        format!("[{text}][]"),
                        format!("[{text}]: {href}{title}"),
                    ),
                    LinkReferenceStyle::Shortcut => {
                        (format!("[{text}]"), format!("[{text}]: {href}{title}"))
                    }
                };

                state.push_footer(reference);
                Ok(Some(add_space_if_necessary(node, markdown)))
            }
        }
    })
}

fn emphasis_rule() -> Rule {
    Rule::simple(&["em", "i"], |content, node, options| {
        // already emphasized by the parent
        if matches!(node.parent_tag(), Some("em" | "i")) {
            return Ok(Some(content.to_string()));
        }

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Some(String::new()));
        }

        let text = delimiter_for_every_line(trimmed, &options.em_delimiter);
        Ok(Some(add_space_if_necessary(node, text)))
    })
}

fn strong_rule() -> Rule {
    Rule::simple(&["strong", "b"], |content, node, options| {
        if matches!(node.parent_tag(), Some("strong" | "b")) {
            return Ok(Some(content.to_string()));
        }

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Some(String::new()));
        }

        let text = delimiter_for_every_line(trimmed, &options.strong_delimiter);
        Ok(Some(add_space_if_necessary(node, text)))
    })
}

fn noscript_rule() -> Rule {
    // children are still walked (their bubbled fragments survive), the
    // rendered result is discarded
    Rule::simple(&["noscript"], |_, _, _| Ok(Some(String::new())))
}

fn iframe_rule() -> Rule {
    Rule::simple(&["iframe"], |_, node, options| {
        let src = clean_attribute(node.attr("src"));

        // inline HTML documents are not converted recursively
        if src.starts_with("data:text/html") {
            return Ok(Some("[embedded document]".to_string()));
        }
        if src.is_empty() {
            return Ok(Some(String::new()));
        }

        let src = absolute_url(options.domain.as_deref(), &src);
        let label = clean_attribute(node.attr("title"));
        let label = if label.is_empty() {
            "iframe".to_string()
        } else {
            label
        };

        Ok(Some(format!("[{label}]({src})")))
    })
}

fn figure_rule() -> Rule {
    Rule::simple(&["figure"], |content, _, _| {
        Ok(Some(format!("\n\n{}\n\n", content.trim())))
    })
}

fn figcaption_rule() -> Rule {
    Rule::simple(&["figcaption"], |content, _, options| {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Some(String::new()));
        }
        let text = delimiter_for_every_line(trimmed, &options.em_delimiter);
        Ok(Some(format!("\n\n{text}\n\n")))
    })
}
