//! Block segmentation: splits source text into runs of non-blank lines.

use std::iter::{Chain, Once};
use std::str::Lines;

/// Iterator over the blocks of a source text.
///
/// A synthetic blank line is appended to the input so the final block is
/// flushed even without a trailing blank line. Blank runs produce no block.
#[derive(Debug)]
pub struct Blocks<'a> {
    lines: Chain<Lines<'a>, Once<&'a str>>,
    current: Vec<&'a str>,
}

/// Split `source` into blocks.
pub fn blocks(source: &str) -> Blocks<'_> {
    Blocks {
        lines: source.lines().chain(std::iter::once("")),
        current: Vec::new(),
    }
}

impl Iterator for Blocks<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        for line in self.lines.by_ref() {
            if !line.trim().is_empty() {
                self.current.push(line);
                continue;
            }
            if self.current.is_empty() {
                continue;
            }
            let block = self.current.join("\n").trim().to_string();
            self.current.clear();
            return Some(block);
        }
        None
    }
}
