//! Headings (ATX and Setext) and horizontal rules.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::Rule;
use crate::pipeline::BlockContext;

// ---------------------------------------------------------------------------
// Headings
// ---------------------------------------------------------------------------

/// `# Title` through `###### Title`, plus `Title` underlined with `=` or `-`.
#[derive(Debug, Default)]
pub struct HeadingRule;

impl HeadingRule {
    pub fn new() -> Self {
        Self
    }
}

impl Rule for HeadingRule {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn process(&mut self, block: &str, _ctx: &BlockContext) -> String {
        static ATX_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?m)^(?P<hashes>#{1,6})[ \t]+(?P<title>.+?)[ \t]*$").expect("valid regex")
        });
        // Lines starting with `<` were already produced by an earlier rule.
        static SETEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?m)^(?P<title>[^<\n][^\n]*)\n(?P<underline>=+|-+)[ \t]*$")
                .expect("valid regex")
        });

        let block = ATX_RE.replace_all(block, |caps: &Captures| {
            render_atx(caps["hashes"].len(), &caps["title"])
        });

        SETEXT_RE
            .replace_all(&block, |caps: &Captures| {
                if is_list_item(&caps["title"]) {
                    return caps[0].to_string();
                }
                let level = if caps["underline"].starts_with('=') { 1 } else { 2 };
                render_heading(level, caps["title"].trim())
            })
            .into_owned()
    }
}

/// Lines the list rule will claim are never Setext titles.
fn is_list_item(line: &str) -> bool {
    static LIST_ITEM_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[ \t]*(?:[-+*]|\d+\.)[ \t]+\S").expect("valid regex"));

    LIST_ITEM_RE.is_match(line)
}

/// Render an ATX heading, dropping a closing run of `#`.
fn render_atx(level: usize, title: &str) -> String {
    static CLOSING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[ \t]+#+$").expect("valid regex"));

    render_heading(level, &CLOSING_RE.replace(title, ""))
}

fn render_heading(level: usize, title: &str) -> String {
    format!("<h{level}>{title}</h{level}>")
}

// ---------------------------------------------------------------------------
// Horizontal rules
// ---------------------------------------------------------------------------

/// A line of three or more `-`, `*` or `_` becomes `<hr />`.
#[derive(Debug, Default)]
pub struct HorizontalRule;

impl HorizontalRule {
    pub fn new() -> Self {
        Self
    }
}

impl Rule for HorizontalRule {
    fn name(&self) -> &'static str {
        "horizontal-rule"
    }

    fn process(&mut self, block: &str, _ctx: &BlockContext) -> String {
        static HR_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?m)^[ \t]*(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|_{3,}[ \t]*)$")
                .expect("valid regex")
        });

        HR_RE.replace_all(block, "<hr />").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn heading(block: &str) -> String {
        HeadingRule::new().process(block, &BlockContext::default())
    }

    fn hr(block: &str) -> String {
        HorizontalRule::new().process(block, &BlockContext::default())
    }

    #[test]
    fn atx_levels() {
        assert_eq!(heading("# Title"), "<h1>Title</h1>");
        assert_eq!(heading("### Three"), "<h3>Three</h3>");
        assert_eq!(heading("###### Six"), "<h6>Six</h6>");
    }

    #[test]
    fn seven_hashes_is_not_a_heading() {
        assert_eq!(heading("####### Seven"), "####### Seven");
    }

    #[test]
    fn atx_requires_whitespace() {
        assert_eq!(heading("#hashtag"), "#hashtag");
    }

    #[test]
    fn closing_hashes_are_stripped() {
        assert_eq!(heading("## Closed ##"), "<h2>Closed</h2>");
        assert_eq!(heading("# Spaced title #####   "), "<h1>Spaced title</h1>");
    }

    #[test]
    fn trailing_hash_in_word_is_kept() {
        assert_eq!(heading("# Learning C#"), "<h1>Learning C#</h1>");
    }

    #[test]
    fn atx_per_line_in_block() {
        assert_eq!(
            heading("# One\n## Two\ntext"),
            "<h1>One</h1>\n<h2>Two</h2>\ntext"
        );
    }

    #[test]
    fn setext_levels() {
        assert_eq!(heading("Title\n====="), "<h1>Title</h1>");
        assert_eq!(heading("Subtitle\n---"), "<h2>Subtitle</h2>");
    }

    #[test]
    fn setext_consumes_only_the_underlined_line() {
        assert_eq!(heading("intro\nTitle\n=="), "intro\n<h1>Title</h1>");
    }

    #[test]
    fn setext_mixed_underline_is_not_a_heading() {
        assert_eq!(heading("Title\n=-="), "Title\n=-=");
    }

    #[test]
    fn setext_ignores_converted_lines() {
        assert_eq!(heading("# Title\n---"), "<h1>Title</h1>\n---");
    }

    #[test]
    fn list_item_is_not_a_setext_title() {
        assert_eq!(heading("- a\n---"), "- a\n---");
        assert_eq!(heading("* a\n==="), "* a\n===");
        assert_eq!(heading("1. first\n---"), "1. first\n---");
    }

    #[test]
    fn hr_variants() {
        assert_eq!(hr("---"), "<hr />");
        assert_eq!(hr("* * *"), "<hr />");
        assert_eq!(hr("_____"), "<hr />");
        assert_eq!(hr("- - - -"), "<hr />");
    }

    #[test]
    fn hr_needs_three_markers() {
        assert_eq!(hr("--"), "--");
        assert_eq!(hr("- item"), "- item");
    }
}
