//! Paragraph fallback: wraps whatever no other rule turned into a block element.

use std::sync::LazyLock;

use regex::Regex;

use super::code::{CODE_CLOSE, CODE_OPEN};
use super::{Rule, is_prelude_line};
use crate::pipeline::BlockContext;

/// Wraps text runs in `<p>`. Container lines, block-level markup and code
/// published by the fence rule each end a run and pass through unchanged.
#[derive(Debug, Default)]
pub struct ParagraphRule;

impl ParagraphRule {
    pub fn new() -> Self {
        Self
    }
}

impl Rule for ParagraphRule {
    fn name(&self) -> &'static str {
        "paragraph"
    }

    fn process(&mut self, block: &str, ctx: &BlockContext) -> String {
        if block.is_empty() {
            return String::new();
        }

        let fence = ctx.fence();
        let tracks_code = fence.touched_code();
        let mut in_code = fence.began_inside;
        // Inside raw HTML opened by an unclosed block-level tag.
        let mut in_raw = false;

        let mut out: Vec<&str> = Vec::new();
        let mut text: Vec<&str> = Vec::new();

        for line in block.lines() {
            if in_code {
                out.push(line);
                if line == CODE_CLOSE {
                    in_code = false;
                }
            } else if tracks_code && line.starts_with(CODE_OPEN) {
                flush_text(&mut text, &mut out);
                out.push(line);
                in_code = true;
            } else if is_container_line(line) {
                flush_text(&mut text, &mut out);
                out.push(line);
                in_raw = false;
            } else if is_block_level(line) {
                flush_text(&mut text, &mut out);
                out.push(line);
                in_raw = opens_unclosed(line);
            } else if in_raw {
                out.push(line);
            } else {
                text.push(line);
            }
        }
        flush_text(&mut text, &mut out);

        out.join("\n")
    }
}

/// Move a run of text lines into `out`, wrapped in a paragraph.
fn flush_text<'a>(text: &mut Vec<&'a str>, out: &mut Vec<&'a str>) {
    if text.is_empty() {
        return;
    }
    out.push("<p>");
    out.append(text);
    out.push("</p>");
}

/// Tags emitted by the blockquote and list rules around their content.
fn is_container_line(line: &str) -> bool {
    is_prelude_line(line) || matches!(line.trim_end(), "<ul>" | "<ol>")
}

fn is_block_level(line: &str) -> bool {
    static BLOCK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"^</?(?:address|article|aside|blockquote|body|dd|details|div|dl|dt|fieldset|figcaption|figure|footer|form|h[1-6]|head|header|hr|html|li|main|nav|ol|p|pre|section|table|tbody|td|tfoot|th|thead|tr|ul|script|style)(?:[\s/>]|$)",
        )
        .expect("valid regex")
    });

    BLOCK_TAG_RE.is_match(line)
}

/// An opening tag whose element continues on the following lines.
fn opens_unclosed(line: &str) -> bool {
    let line = line.trim_end();
    !line.contains("</") && !line.ends_with("/>")
}
