//! HTML special characters: `<`, `>` and bare `&`.
//!
//! Runs before every other rule. Later rules emit literal markup on top of
//! the escaped text, and the autolink and tag rules look for `&lt;...&gt;`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::Rule;
use crate::pipeline::BlockContext;

/// Escapes `<`, `>` and any `&` that does not already start an entity.
#[derive(Debug, Default)]
pub struct SpecialCharRule;

impl SpecialCharRule {
    pub fn new() -> Self {
        Self
    }
}

impl Rule for SpecialCharRule {
    fn name(&self) -> &'static str {
        "special-char"
    }

    fn process(&mut self, block: &str, _ctx: &BlockContext) -> String {
        escape_special_chars(block)
    }
}

/// Escape HTML-significant characters, leaving existing entities alone.
pub fn escape_special_chars(text: &str) -> String {
    static SPECIAL_RE: LazyLock<Regex> = LazyLock::new(|| {
        // A bare `&` matches with the optional entity tail empty.
        Regex::new(r"[<>]|&(?:#[0-9]+;|#[xX][0-9a-fA-F]+;|[A-Za-z][A-Za-z0-9]*;)?")
            .expect("valid regex")
    });

    SPECIAL_RE
        .replace_all(text, |caps: &Captures| match &caps[0] {
            "<" => "&lt;".to_string(),
            ">" => "&gt;".to_string(),
            "&" => "&amp;".to_string(),
            entity => entity.to_string(),
        })
        .into_owned()
}
