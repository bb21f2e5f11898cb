//! Strong (`**x**`, `__x__`) and emphasis (`*x*`, `_x_`).
//!
//! A marked run must be non-empty and contain no whitespace. Double markers
//! are replaced before single ones so `*` never eats half of a `**` pair.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::Rule;
use crate::pipeline::BlockContext;

/// Which part of the block the rule rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmphasisScope {
    /// The whole block.
    Block,
    /// Only the labels of inline links (`[label](...)`), before the link
    /// rule escapes them.
    LinkLabels,
}

#[derive(Debug)]
pub struct EmphasisRule {
    scope: EmphasisScope,
}

impl EmphasisRule {
    pub fn new() -> Self {
        Self {
            scope: EmphasisScope::Block,
        }
    }

    pub fn in_link_labels() -> Self {
        Self {
            scope: EmphasisScope::LinkLabels,
        }
    }
}

impl Default for EmphasisRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for EmphasisRule {
    fn name(&self) -> &'static str {
        match self.scope {
            EmphasisScope::Block => "emphasis",
            EmphasisScope::LinkLabels => "emphasis-link-labels",
        }
    }

    fn process(&mut self, block: &str, _ctx: &BlockContext) -> String {
        static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?P<bang>!?)\[(?P<label>[^\[\]]+)\]\(").expect("valid regex")
        });

        match self.scope {
            EmphasisScope::Block => emphasize(block),
            EmphasisScope::LinkLabels => LABEL_RE
                .replace_all(block, |caps: &Captures| {
                    if caps["bang"].is_empty() {
                        format!("[{}](", emphasize(&caps["label"]))
                    } else {
                        caps[0].to_string()
                    }
                })
                .into_owned(),
        }
    }
}

/// Apply strong then emphasis markup to `text`.
pub fn emphasize(text: &str) -> String {
    static STRONG_STAR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*\*(?P<body>[^*\s]+)\*\*").expect("valid regex"));
    static STRONG_UNDERSCORE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"__(?P<body>[^_\s]+)__").expect("valid regex"));
    static EM_STAR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*(?P<body>[^*\s]+)\*").expect("valid regex"));
    static EM_UNDERSCORE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"_(?P<body>[^_\s]+)_").expect("valid regex"));

    let text = STRONG_STAR_RE.replace_all(text, "<strong>${body}</strong>");
    let text = STRONG_UNDERSCORE_RE.replace_all(&text, "<strong>${body}</strong>");
    let text = EM_STAR_RE.replace_all(&text, "<em>${body}</em>");
    EM_UNDERSCORE_RE
        .replace_all(&text, "<em>${body}</em>")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strong_and_em() {
        assert_eq!(emphasize("**a** __b__"), "<strong>a</strong> <strong>b</strong>");
        assert_eq!(emphasize("*a* _b_"), "<em>a</em> <em>b</em>");
    }

    #[test]
    fn nested_markers_follow_marker_nesting() {
        assert_eq!(emphasize("**_x_**"), "<strong><em>x</em></strong>");
        assert_eq!(emphasize("_**x**_"), "<em><strong>x</strong></em>");
    }

    #[test]
    fn emphasis_cannot_span_whitespace() {
        assert_eq!(emphasize("*two words*"), "*two words*");
        assert_eq!(emphasize("2 * 3 * 4"), "2 * 3 * 4");
    }

    #[test]
    fn unbalanced_markers_stay_literal() {
        assert_eq!(emphasize("**open"), "**open");
        assert_eq!(emphasize("a_b"), "a_b");
    }

    #[test]
    fn neutralized_markers_are_ignored() {
        assert_eq!(emphasize("&ast;a&ast;"), "&ast;a&ast;");
    }

    #[test]
    fn link_label_scope_only_touches_labels() {
        let mut rule = EmphasisRule::in_link_labels();
        let out = rule.process(
            "*outside* [**bold**](http://x_y_z)",
            &BlockContext::default(),
        );
        assert_eq!(out, "*outside* [<strong>bold</strong>](http://x_y_z)");
    }

    #[test]
    fn link_label_scope_skips_images() {
        let mut rule = EmphasisRule::in_link_labels();
        let out = rule.process("![*alt*](a.png)", &BlockContext::default());
        assert_eq!(out, "![*alt*](a.png)");
    }

    #[test]
    fn names_differ_by_scope() {
        assert_eq!(EmphasisRule::new().name(), "emphasis");
        assert_eq!(EmphasisRule::in_link_labels().name(), "emphasis-link-labels");
    }
}
