//! Batch conversion and page assembly for mdhtml.
//!
//! This crate ties the Markdown pipeline to the filesystem: it renders each
//! [`ConversionJob`](mdhtml_shared::ConversionJob), wraps the blocks in page
//! boilerplate and writes the result.

pub mod assembler;
pub mod batch;

pub use assembler::{Document, write_document};
pub use batch::{
    BatchReport, JobOutcome, ProgressReporter, SilentProgress, convert_batch, convert_job,
    render_document,
};
