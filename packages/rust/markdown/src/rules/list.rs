//! Unordered and ordered lists.
//!
//! Every matching line becomes an `<li>`. A list stays open across blocks
//! until a block without any item closes it, so items separated by blank
//! lines end up in one container.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::{Rule, insert_after_prelude, outside_code, prepend_line};
use crate::pipeline::BlockContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn pattern(self) -> &'static Regex {
        static UNORDERED_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?m)^[ \t]*[-+*][ \t]+(?P<item>.+)$").expect("valid regex")
        });
        static ORDERED_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?m)^[ \t]*\d+\.[ \t]+(?P<item>.+)$").expect("valid regex")
        });

        match self {
            Self::Unordered => &UNORDERED_RE,
            Self::Ordered => &ORDERED_RE,
        }
    }

    fn open_tag(self) -> &'static str {
        match self {
            Self::Unordered => "<ul>",
            Self::Ordered => "<ol>",
        }
    }

    fn close_tag(self) -> &'static str {
        match self {
            Self::Unordered => "</ul>",
            Self::Ordered => "</ol>",
        }
    }
}

/// Tracks whether an unordered and an ordered list are open.
#[derive(Debug, Default)]
pub struct ListRule {
    inside_unordered: bool,
    inside_ordered: bool,
}

impl ListRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an unordered list container is open.
    pub fn in_unordered(&self) -> bool {
        self.inside_unordered
    }

    /// Whether an ordered list container is open.
    pub fn in_ordered(&self) -> bool {
        self.inside_ordered
    }
}

impl Rule for ListRule {
    fn name(&self) -> &'static str {
        "list"
    }

    fn process(&mut self, block: &str, ctx: &BlockContext) -> String {
        outside_code(block, ctx, |text| {
            let text = apply_list(text, ListKind::Unordered, &mut self.inside_unordered);
            apply_list(&text, ListKind::Ordered, &mut self.inside_ordered)
        })
    }

    fn reset(&mut self) {
        self.inside_unordered = false;
        self.inside_ordered = false;
    }
}

fn apply_list(block: &str, kind: ListKind, inside: &mut bool) -> String {
    let pattern = kind.pattern();

    if !pattern.is_match(block) {
        if *inside {
            trace!(?kind, "list closed");
            *inside = false;
            return prepend_line(kind.close_tag(), block);
        }
        return block.to_string();
    }

    let items = pattern.replace_all(block, "<li>${item}</li>");
    if *inside {
        items.into_owned()
    } else {
        trace!(?kind, "list opened");
        *inside = true;
        insert_after_prelude(&items, kind.open_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(rule: &mut ListRule, block: &str) -> String {
        rule.process(block, &BlockContext::default())
    }

    #[test]
    fn unordered_markers() {
        let mut rule = ListRule::new();
        assert_eq!(
            run(&mut rule, "- one\n+ two\n* three"),
            "<ul>\n<li>one</li>\n<li>two</li>\n<li>three</li>"
        );
        assert!(rule.in_unordered());
    }

    #[test]
    fn ordered_markers() {
        let mut rule = ListRule::new();
        assert_eq!(
            run(&mut rule, "1. one\n2. two"),
            "<ol>\n<li>one</li>\n<li>two</li>"
        );
        assert!(rule.in_ordered());
        assert!(!rule.in_unordered());
    }

    #[test]
    fn list_continues_across_blank_line() {
        let mut rule = ListRule::new();
        assert_eq!(run(&mut rule, "- a\n- b"), "<ul>\n<li>a</li>\n<li>b</li>");
        assert_eq!(run(&mut rule, "- c"), "<li>c</li>");
        assert_eq!(run(&mut rule, "after"), "</ul>\nafter");
        assert!(!rule.in_unordered());
    }

    #[test]
    fn switching_list_kinds_closes_the_first() {
        let mut rule = ListRule::new();
        run(&mut rule, "- a");
        assert_eq!(run(&mut rule, "1. b"), "</ul>\n<ol>\n<li>b</li>");
        assert_eq!(run(&mut rule, "- c"), "</ol>\n<ul>\n<li>c</li>");
    }

    #[test]
    fn opening_goes_inside_blockquote() {
        let mut rule = ListRule::new();
        assert_eq!(
            run(&mut rule, "<blockquote>\n- a"),
            "<blockquote>\n<ul>\n<li>a</li>"
        );
        assert_eq!(
            run(&mut rule, "</blockquote>\nafter"),
            "</ul>\n</blockquote>\nafter"
        );
    }

    #[test]
    fn empty_block_closes_both() {
        let mut rule = ListRule::new();
        run(&mut rule, "- a\n1. b");
        assert_eq!(run(&mut rule, ""), "</ol>\n</ul>");
        assert!(!rule.in_unordered());
        assert!(!rule.in_ordered());
    }

    #[test]
    fn marker_needs_whitespace() {
        let mut rule = ListRule::new();
        assert_eq!(run(&mut rule, "-dash\n**bold**\n1.5 apples"), "-dash\n**bold**\n1.5 apples");
        assert!(!rule.in_unordered());
        assert!(!rule.in_ordered());
    }

    #[test]
    fn indented_items_match() {
        let mut rule = ListRule::new();
        assert_eq!(run(&mut rule, "- a\n  - b"), "<ul>\n<li>a</li>\n<li>b</li>");
    }

    #[test]
    fn reset_clears_both_flags() {
        let mut rule = ListRule::new();
        run(&mut rule, "- a\n1. b");
        rule.reset();
        assert!(!rule.in_unordered());
        assert!(!rule.in_ordered());
        assert_eq!(run(&mut rule, "plain"), "plain");
    }
}
