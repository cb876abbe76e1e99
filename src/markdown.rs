//! Markdown to HTML conversion that leaves template syntax alone.
//!
//! Markdown sources are converted before they are rendered as templates.
//! Template tags (`{{ … }}`, `{% … %}`, `{# … #}`) are swapped for
//! placeholders before the markdown pass and put back verbatim afterwards,
//! so markdown escaping and paragraph wrapping never reach them.

use pulldown_cmark::{html::push_html, CodeBlockKind, Event, Options, Parser, Tag};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// Matches a single template tag, possibly spanning lines.
fn template_span() -> &'static Regex {
    static TEMPLATE_SPAN: OnceLock<Regex> = OnceLock::new();
    TEMPLATE_SPAN.get_or_init(|| {
        Regex::new(r"(?s)\{\{.*?\}\}|\{%.*?%\}|\{#.*?#\}").expect("template span regex is valid")
    })
}

/// Converts markdown to HTML.
///
/// Uses pulldown-cmark with tables, strikethrough, task lists and
/// footnotes enabled.
pub fn markdown_to_html(source: &str) -> String {
    let (shielded, spans) = shield_template_syntax(source);

    let parser = Parser::new_ext(&shielded, markdown_options());

    let mut html = String::with_capacity(source.len() * 2);
    push_html(&mut html, parser);

    restore_template_syntax(html, &spans)
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

// Plain alphanumerics survive text escaping, href escaping and emphasis parsing.
fn inline_placeholder(index: usize) -> String {
    format!("CASCADEx{index}xTPL")
}

// A comment alone on its line is passed through as a raw HTML block, so a
// statement tag on its own line is not wrapped in a paragraph.
fn block_placeholder(index: usize) -> String {
    format!("<!--{}-->", inline_placeholder(index))
}

fn escaped_block_placeholder(index: usize) -> String {
    format!("&lt;!--{}--&gt;", inline_placeholder(index))
}

/// Returns true if the tag at `start..end` is a statement or comment with
/// nothing but whitespace around it on its line(s).
fn is_standalone_statement(source: &str, start: usize, end: usize) -> bool {
    let tag = &source[start..end];
    if !(tag.starts_with("{%") || tag.starts_with("{#")) {
        return false;
    }
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[end..].find('\n').map_or(source.len(), |i| end + i);
    source[line_start..start].trim().is_empty() && source[end..line_end].trim().is_empty()
}

/// Byte ranges of list items, block quotes and fenced code blocks.
///
/// A statement tag inside one of these stays inline: a block placeholder
/// would have to leave the container's indentation and close it.
fn container_ranges(source: &str) -> Vec<Range<usize>> {
    Parser::new_ext(source, markdown_options())
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(
                Tag::Item | Tag::BlockQuote(_) | Tag::CodeBlock(CodeBlockKind::Fenced(_)),
            ) => Some(range),
            _ => None,
        })
        .collect()
}

fn shield_template_syntax(source: &str) -> (String, Vec<String>) {
    let mut shielded = String::with_capacity(source.len());
    let mut spans = Vec::new();
    let mut last = 0;
    let containers = container_ranges(source);

    for m in template_span().find_iter(source) {
        shielded.push_str(&source[last..m.start()]);
        let index = spans.len();
        let contained = containers.iter().any(|range| range.contains(&m.start()));
        if !contained && is_standalone_statement(source, m.start(), m.end()) {
            // Indentation would turn the placeholder into a code block.
            let trimmed = shielded.trim_end_matches(&[' ', '\t'][..]).len();
            shielded.truncate(trimmed);
            shielded.push_str(&block_placeholder(index));
        } else {
            shielded.push_str(&inline_placeholder(index));
        }
        spans.push(m.as_str().to_string());
        last = m.end();
    }
    shielded.push_str(&source[last..]);

    (shielded, spans)
}

fn restore_template_syntax(mut html: String, spans: &[String]) -> String {
    for (index, span) in spans.iter().enumerate() {
        // Block forms first: they contain the inline form.
        html = html
            .replace(&block_placeholder(index), span)
            .replace(&escaped_block_placeholder(index), span)
            .replace(&inline_placeholder(index), span);
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_markdown() {
        let html = markdown_to_html("# Title\n\nSome *text*.\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<p>Some <em>text</em>.</p>"));
    }

    #[test]
    fn test_expression_survives_escaping() {
        let html = markdown_to_html("Hello {{ \"<b>\" ~ name }}!\n");
        assert_eq!(html, "<p>Hello {{ \"<b>\" ~ name }}!</p>\n");
    }

    #[test]
    fn test_expression_in_link_target() {
        let html = markdown_to_html("[home]({{ base_url }}/index.html)\n");
        assert!(html.contains("href=\"{{ base_url }}/index.html\""));
    }

    #[test]
    fn test_standalone_statement_not_wrapped() {
        let html = markdown_to_html("{% if a > b %}\nbigger\n{% endif %}\n");
        assert!(html.contains("{% if a > b %}"));
        assert!(html.contains("<p>bigger</p>"));
        assert!(html.contains("{% endif %}"));
        assert!(!html.contains("<p>{%"));
    }

    #[test]
    fn test_indented_statement_not_code() {
        let html = markdown_to_html("    {% set x = 1 %}\ntext\n");
        assert!(!html.contains("<pre>"));
        assert!(html.contains("{% set x = 1 %}"));
    }

    #[test]
    fn test_inline_statement_keeps_paragraph() {
        let html = markdown_to_html("a {% if x %}b{% endif %} c\n");
        assert_eq!(html, "<p>a {% if x %}b{% endif %} c</p>\n");
    }

    #[test]
    fn test_statement_inside_list_item() {
        let html = markdown_to_html("- a\n  {% if x %}\n  b\n  {% endif %}\n- c\n");

        assert_eq!(html.matches("<ul>").count(), 1);
        assert!(html.contains("<li>c</li>"));
        let first_item = &html[html.find("<li>").unwrap()..html.find("</li>").unwrap()];
        assert!(first_item.contains("{% if x %}"));
        assert!(first_item.contains('b'));
        assert!(first_item.contains("{% endif %}"));
    }

    #[test]
    fn test_statement_inside_block_quote() {
        let html = markdown_to_html("> {% if x %}\n> quoted\n> {% endif %}\n");

        assert_eq!(html.matches("<blockquote>").count(), 1);
        assert!(html.find("{% endif %}").unwrap() < html.find("</blockquote>").unwrap());
    }

    #[test]
    fn test_indented_tag_in_fenced_code_kept() {
        let html = markdown_to_html("```\n  {% raw %}\n```\n");
        assert!(html.contains("  {% raw %}"));
    }

    #[test]
    fn test_tag_in_code_block_restored() {
        let html = markdown_to_html("```\n{% raw %}\n```\n");
        assert!(html.contains("{% raw %}"));
        assert!(!html.contains("CASCADEx"));
    }
}
