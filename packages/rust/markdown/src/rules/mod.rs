//! Transformation rules applied to every block, in pipeline order.
//!
//! Each rule rewrites exactly one construct. Rules that need context from
//! earlier blocks of the same document keep it in their own fields and clear
//! it in [`Rule::reset`].

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::BlockContext;
use code::CODE_CLOSE;

pub mod blockquote;
pub mod code;
pub mod emphasis;
pub mod escape;
pub mod heading;
pub mod link;
pub mod list;
pub mod paragraph;

pub use blockquote::BlockquoteRule;
pub use code::{FenceRule, InlineCodeRule};
pub use emphasis::{EmphasisRule, EmphasisScope};
pub use escape::SpecialCharRule;
pub use heading::{HeadingRule, HorizontalRule};
pub use link::{ImageRule, LinkRule};
pub use list::ListRule;
pub use paragraph::ParagraphRule;

// ---------------------------------------------------------------------------
// Rule contract
// ---------------------------------------------------------------------------

/// One step of the rule pipeline.
pub trait Rule: Send {
    /// Short name used in trace output.
    fn name(&self) -> &'static str;

    /// Rewrite one block. Must accept any text without failing.
    fn process(&mut self, block: &str, ctx: &BlockContext) -> String;

    /// Forget everything carried over from previous blocks.
    fn reset(&mut self) {}

    /// Expose per-block state to the rules that run after this one.
    fn publish(&self, _ctx: &mut BlockContext) {}
}

// ---------------------------------------------------------------------------
// Container lines
// ---------------------------------------------------------------------------

/// Lines emitted by stateful rules to open or close a container that spans blocks.
const PRELUDE_LINES: [&str; 4] = ["<blockquote>", "</blockquote>", "</ul>", "</ol>"];

pub(crate) fn is_prelude_line(line: &str) -> bool {
    PRELUDE_LINES.contains(&line.trim_end())
}

/// Byte length of the leading run of container lines.
fn prelude_len(block: &str) -> usize {
    let mut offset = 0;
    for line in block.split_inclusive('\n') {
        if !is_prelude_line(line) {
            break;
        }
        offset += line.len();
    }
    offset
}

/// Put `line` in front of `block` on its own line.
pub(crate) fn prepend_line(line: &str, block: &str) -> String {
    if block.is_empty() {
        line.to_string()
    } else {
        format!("{line}\n{block}")
    }
}

/// Insert `line` after the leading container lines so that an opening tag
/// lands inside an enclosing blockquote and after any closed sibling list.
pub(crate) fn insert_after_prelude(block: &str, line: &str) -> String {
    let (head, tail) = block.split_at(prelude_len(block));
    if !head.is_empty() && !head.ends_with('\n') {
        return format!("{head}\n{line}");
    }
    if tail.is_empty() {
        format!("{head}{line}")
    } else {
        format!("{head}{line}\n{tail}")
    }
}

/// Apply a container rule to the part of `block` that is not code.
///
/// A block that starts inside an open fence is code up to the closing fence
/// line. Only the text after that line is handed to `apply`, so opening and
/// closing tags never land inside the code body. A block that stays inside
/// the fence is returned untouched.
pub(crate) fn outside_code(
    block: &str,
    ctx: &BlockContext,
    apply: impl FnOnce(&str) -> String,
) -> String {
    if !ctx.fence().began_inside {
        return apply(block);
    }

    let Some((code, rest)) = split_after_code(block) else {
        return block.to_string();
    };
    let rest = apply(rest);
    if rest.is_empty() {
        code.to_string()
    } else {
        format!("{code}\n{rest}")
    }
}

/// Split at the first closing fence line. The code half keeps that line.
fn split_after_code(block: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in block.split_inclusive('\n') {
        offset += line.len();
        if line.trim_end() == CODE_CLOSE {
            let code = block[..offset].strip_suffix('\n').unwrap_or(&block[..offset]);
            return Some((code, &block[offset..]));
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Neutralizing markdown-significant characters
// ---------------------------------------------------------------------------

/// Replacements for text inside an inline code span.
pub(crate) const INLINE_CODE_ENTITIES: &[(char, &str)] = &[
    ('#', "&num;"),
    ('_', "&lowbar;"),
    ('*', "&ast;"),
    ('[', "&lbrack;"),
    (']', "&rbrack;"),
    ('(', "&lpar;"),
    (')', "&rpar;"),
    ('{', "&lbrace;"),
    ('}', "&rbrace;"),
    ('\\', "&bsol;"),
    ('!', "&excl;"),
];

/// Replacements for lines inside a fenced block. Line-anchored markers
/// (list bullets, ordered numbers, Setext underlines, nested fences) are
/// covered on top of the inline set.
pub(crate) const CODE_BLOCK_ENTITIES: &[(char, &str)] = &[
    ('#', "&num;"),
    ('_', "&lowbar;"),
    ('*', "&ast;"),
    ('+', "&plus;"),
    ('`', "&grave;"),
    ('[', "&lbrack;"),
    (']', "&rbrack;"),
    ('(', "&lpar;"),
    (')', "&rpar;"),
    ('{', "&lbrace;"),
    ('}', "&rbrace;"),
    ('\\', "&bsol;"),
    ('!', "&excl;"),
    ('.', "&period;"),
    ('-', "&#45;"),
    ('=', "&equals;"),
];

/// Replace every character listed in `table` with its entity.
///
/// Existing entities are copied through whole. The three produced by
/// special-character escaping become numeric references, which the
/// blockquote, autolink and tag rules do not recognize.
pub(crate) fn neutralize(text: &str, table: &[(char, &str)]) -> String {
    static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").expect("valid regex")
    });

    let mut out = String::with_capacity(text.len() * 2);
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if c == '&' {
            match ENTITY_RE.find(rest) {
                Some(m) => {
                    out.push_str(match m.as_str() {
                        "&lt;" => "&#60;",
                        "&gt;" => "&#62;",
                        "&amp;" => "&#38;",
                        entity => entity,
                    });
                    rest = &rest[m.end()..];
                }
                None => {
                    out.push_str("&#38;");
                    rest = &rest[1..];
                }
            }
            continue;
        }

        match table.iter().find(|(ch, _)| *ch == c) {
            Some((_, entity)) => out.push_str(entity),
            None => out.push(c),
        }
        rest = &rest[c.len_utf8()..];
    }

    out
}
