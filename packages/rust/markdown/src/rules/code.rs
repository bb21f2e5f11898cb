//! Code rules: fenced blocks and inline spans.
//!
//! A fence can open in one block and close many blocks later, so
//! [`FenceRule`] carries an open/closed flag across blocks and publishes a
//! [`FenceSnapshot`] for the paragraph rule. Code text is neutralized to
//! entities so no later rule reinterprets it.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use super::{CODE_BLOCK_ENTITIES, INLINE_CODE_ENTITIES, Rule, neutralize};
use crate::pipeline::{BlockContext, FenceSnapshot};

/// Prefix of the line that opens a code block.
pub(crate) const CODE_OPEN: &str = "<pre><code";

/// Line that closes a code block.
pub(crate) const CODE_CLOSE: &str = "</code></pre>";

// ---------------------------------------------------------------------------
// Fenced code blocks
// ---------------------------------------------------------------------------

/// Toggles between outside and inside a fenced code block on lines made of
/// three or more backticks.
#[derive(Debug, Default)]
pub struct FenceRule {
    open: bool,
    snapshot: FenceSnapshot,
}

impl FenceRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a fence is currently open.
    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl Rule for FenceRule {
    fn name(&self) -> &'static str {
        "fence"
    }

    fn process(&mut self, block: &str, _ctx: &BlockContext) -> String {
        static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[ \t]*`{3,}[ \t]*([^`\s]*)[ \t]*$").expect("valid regex")
        });

        let began_inside = self.open;
        let mut transitions = 0;

        // The empty block only arrives at end of document.
        if block.is_empty() {
            let out = if self.open {
                debug!("closing fence left open at end of document");
                self.open = false;
                transitions = 1;
                CODE_CLOSE.to_string()
            } else {
                String::new()
            };
            self.snapshot = FenceSnapshot {
                began_inside,
                ends_inside: false,
                transitions,
            };
            return out;
        }

        let mut lines: Vec<String> = Vec::new();
        for line in block.lines() {
            let fence = FENCE_RE.captures(line);
            match (self.open, fence) {
                (false, Some(caps)) => {
                    let info = &caps[1];
                    debug!(info, "fence opened");
                    lines.push(open_markup(info));
                    self.open = true;
                    transitions += 1;
                }
                (true, Some(caps)) if caps[1].is_empty() => {
                    debug!("fence closed");
                    lines.push(CODE_CLOSE.to_string());
                    self.open = false;
                    transitions += 1;
                }
                (true, _) => lines.push(neutralize(line, CODE_BLOCK_ENTITIES)),
                (false, None) => lines.push(line.to_string()),
            }
        }

        self.snapshot = FenceSnapshot {
            began_inside,
            ends_inside: self.open,
            transitions,
        };
        lines.join("\n")
    }

    fn reset(&mut self) {
        self.open = false;
        self.snapshot = FenceSnapshot::default();
    }

    fn publish(&self, ctx: &mut BlockContext) {
        ctx.set_fence(self.snapshot);
    }
}

/// Opening markup, with a language class when the info string is a plain name.
fn open_markup(info: &str) -> String {
    let is_language = !info.is_empty()
        && info
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '#' | '.' | '-'));

    if is_language {
        format!("{CODE_OPEN} class=\"language-{info}\">")
    } else {
        format!("{CODE_OPEN}>")
    }
}

// ---------------------------------------------------------------------------
// Inline code spans
// ---------------------------------------------------------------------------

/// `` `code` `` on a single line becomes `<code>code</code>`.
#[derive(Debug, Default)]
pub struct InlineCodeRule;

impl InlineCodeRule {
    pub fn new() -> Self {
        Self
    }
}

impl Rule for InlineCodeRule {
    fn name(&self) -> &'static str {
        "inline-code"
    }

    fn process(&mut self, block: &str, _ctx: &BlockContext) -> String {
        static INLINE_CODE_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"`(?P<code>[^`\n]+)`").expect("valid regex"));

        INLINE_CODE_RE
            .replace_all(block, |caps: &Captures| render_inline_code(&caps["code"]))
            .into_owned()
    }
}

fn render_inline_code(code: &str) -> String {
    format!("<code>{}</code>", neutralize(code, INLINE_CODE_ENTITIES))
}
