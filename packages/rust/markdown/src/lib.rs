//! Markdown-to-HTML rendering by ordered, stateful rule application.
//!
//! Source text is split into blocks (runs of non-blank lines), and each block
//! is passed through a fixed sequence of [`rules`]. Some rules keep state
//! across blocks (code fences, lists, blockquotes), which lets nested HTML be
//! assembled from line-oriented syntax without a parse tree.

pub mod pipeline;
pub mod rules;
pub mod segment;

use tracing::instrument;

use mdhtml_shared::RenderConfig;

pub use pipeline::{BlockContext, FenceSnapshot, Pipeline};
pub use rules::Rule;
pub use segment::{Blocks, blocks};

/// Render a complete document to its HTML blocks with a fresh pipeline.
#[instrument(skip_all)]
pub fn render_blocks(source: &str, config: &RenderConfig) -> Vec<String> {
    Pipeline::with_config(config).render(source)
}
