//! The ordered rule pipeline and its per-document lifecycle.
//!
//! Every block passes through every rule, in the order fixed by
//! [`Pipeline::with_config`]. Rules that carry state between blocks are
//! reset by [`Pipeline::begin_document`]; [`Pipeline::end_document`] feeds a
//! final empty block so that every open container gets closed.

use tracing::{debug, instrument, trace};

use mdhtml_shared::RenderConfig;

use crate::rules::{
    BlockquoteRule, EmphasisRule, FenceRule, HeadingRule, HorizontalRule, ImageRule,
    InlineCodeRule, LinkRule, ListRule, ParagraphRule, Rule, SpecialCharRule,
};
use crate::segment;

// ---------------------------------------------------------------------------
// Block context
// ---------------------------------------------------------------------------

/// What the fence rule saw in the current block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FenceSnapshot {
    /// A fence was already open when the block started.
    pub began_inside: bool,
    /// A fence is still open after the block.
    pub ends_inside: bool,
    /// Number of fence lines (opening or closing) in the block.
    pub transitions: usize,
}

impl FenceSnapshot {
    /// Whether any part of the block is code.
    pub fn touched_code(&self) -> bool {
        self.began_inside || self.transitions > 0
    }
}

/// Per-block state written by the fence rule and read by later rules.
#[derive(Debug, Default)]
pub struct BlockContext {
    fence: FenceSnapshot,
}

impl BlockContext {
    pub fn fence(&self) -> FenceSnapshot {
        self.fence
    }

    pub(crate) fn set_fence(&mut self, fence: FenceSnapshot) {
        self.fence = fence;
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Ordered set of transformation rules.
pub struct Pipeline {
    rules: Vec<Box<dyn Rule>>,
}

impl Pipeline {
    /// Pipeline with default render options.
    pub fn new() -> Self {
        Self::with_config(&RenderConfig::default())
    }

    /// Build the pipeline. The order matters: escaping must come first,
    /// code must be neutralized before any syntax rule sees it, headings and
    /// rules before lists, and emphasis runs once on link labels before the
    /// link rule escapes them and once more afterwards.
    pub fn with_config(config: &RenderConfig) -> Self {
        let rules: Vec<Box<dyn Rule>> = vec![
            Box::new(SpecialCharRule::new()),
            Box::new(FenceRule::new()),
            Box::new(InlineCodeRule::new()),
            Box::new(HeadingRule::new()),
            Box::new(HorizontalRule::new()),
            Box::new(BlockquoteRule::new()),
            Box::new(ListRule::new()),
            Box::new(EmphasisRule::in_link_labels()),
            Box::new(ImageRule::new()),
            Box::new(LinkRule::new(config)),
            Box::new(EmphasisRule::new()),
            Box::new(ParagraphRule::new()),
        ];
        Self { rules }
    }

    /// Rule names in application order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Clear all cross-block state. Call before each independent document.
    pub fn begin_document(&mut self) {
        for rule in &mut self.rules {
            rule.reset();
        }
    }

    /// Run one block through every rule.
    pub fn render_block(&mut self, block: &str) -> String {
        let mut ctx = BlockContext::default();
        let mut current = block.to_string();

        for rule in &mut self.rules {
            current = rule.process(&current, &ctx);
            rule.publish(&mut ctx);
            trace!(rule = rule.name(), block = %current, "rule applied");
        }

        current
    }

    /// Close whatever the document left open. Returns the closing markup, if any.
    pub fn end_document(&mut self) -> Option<String> {
        let closing = self.render_block("");
        (!closing.is_empty()).then_some(closing)
    }

    /// Render a whole document into its transformed blocks.
    #[instrument(skip_all, fields(source_len = source.len()))]
    pub fn render(&mut self, source: &str) -> Vec<String> {
        self.begin_document();

        let mut rendered: Vec<String> = segment::blocks(source)
            .map(|block| self.render_block(&block))
            .collect();

        if let Some(closing) = self.end_document() {
            rendered.push(closing);
        }

        debug!(blocks = rendered.len(), "document rendered");
        rendered
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("rules", &self.rule_names())
            .finish()
    }
}
