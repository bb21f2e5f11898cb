//! Blockquotes: lines starting with `>` (already escaped to `&gt;`).

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::{Rule, outside_code, prepend_line};
use crate::pipeline::BlockContext;

/// Strips `> ` prefixes and wraps consecutive quoted blocks in one
/// `<blockquote>` container.
#[derive(Debug, Default)]
pub struct BlockquoteRule {
    inside: bool,
}

impl BlockquoteRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a blockquote container is currently open.
    pub fn is_open(&self) -> bool {
        self.inside
    }

    fn apply(&mut self, block: &str) -> String {
        static QUOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?m)^&gt;[ \t]+(?P<content>\S.*)$").expect("valid regex")
        });

        let quoted = QUOTE_RE.is_match(block);

        match (quoted, self.inside) {
            (true, false) => {
                trace!("blockquote opened");
                self.inside = true;
                prepend_line("<blockquote>", &QUOTE_RE.replace_all(block, "${content}"))
            }
            (true, true) => QUOTE_RE.replace_all(block, "${content}").into_owned(),
            (false, true) => {
                trace!("blockquote closed");
                self.inside = false;
                prepend_line("</blockquote>", block)
            }
            (false, false) => block.to_string(),
        }
    }
}

impl Rule for BlockquoteRule {
    fn name(&self) -> &'static str {
        "blockquote"
    }

    fn process(&mut self, block: &str, ctx: &BlockContext) -> String {
        outside_code(block, ctx, |text| self.apply(text))
    }

    fn reset(&mut self) {
        self.inside = false;
    }
}
