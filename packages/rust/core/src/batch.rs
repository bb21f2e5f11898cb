//! Batch conversion: Markdown files in, HTML pages out.
//!
//! One [`Pipeline`] is built per batch and reset with
//! [`Pipeline::begin_document`] before each file, so no block state leaks
//! from one document into the next. A job that cannot be read or written is
//! recorded as failed and the batch moves on.

use std::path::Path;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use mdhtml_markdown::Pipeline;
use mdhtml_shared::{ConversionJob, MdHtmlError, RenderConfig, Result};

use crate::assembler::{Document, write_document};

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting batch status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each job, successful or not.
    fn file_converted(&self, outcome: &JobOutcome, current: usize, total: usize);
    /// Called when the batch completes.
    fn done(&self, report: &BatchReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn file_converted(&self, _outcome: &JobOutcome, _current: usize, _total: usize) {}
    fn done(&self, _report: &BatchReport) {}
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Result of a single job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobOutcome {
    pub job: ConversionJob,
    pub success: bool,
    /// Why the job failed, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a whole batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
    #[serde(serialize_with = "serialize_millis", rename = "elapsed_ms")]
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// The human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "All finished: {} conversion(s) succeeded, {} conversion(s) failed.",
            self.succeeded(),
            self.failed()
        )
    }
}

fn serialize_millis<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Convert every job in order.
#[instrument(skip_all, fields(jobs = jobs.len()))]
pub fn convert_batch(
    jobs: &[ConversionJob],
    config: &RenderConfig,
    progress: &dyn ProgressReporter,
) -> BatchReport {
    let start = Instant::now();
    let total = jobs.len();
    let mut pipeline = Pipeline::with_config(config);
    let mut outcomes = Vec::with_capacity(total);

    info!(total, "starting batch conversion");
    progress.phase("Converting");

    for (i, job) in jobs.iter().enumerate() {
        let outcome = match convert_job(&mut pipeline, job) {
            Ok(()) => JobOutcome {
                job: job.clone(),
                success: true,
                error: None,
            },
            Err(e) => {
                warn!(source = %job.source.display(), error = %e, "conversion failed");
                JobOutcome {
                    job: job.clone(),
                    success: false,
                    error: Some(e.to_string()),
                }
            }
        };
        progress.file_converted(&outcome, i + 1, total);
        outcomes.push(outcome);
    }

    let report = BatchReport {
        outcomes,
        elapsed: start.elapsed(),
    };

    progress.done(&report);

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        elapsed_ms = report.elapsed.as_millis(),
        "batch conversion complete"
    );

    report
}

/// Convert one job with an existing pipeline.
#[instrument(skip_all, fields(source = %job.source.display(), destination = %job.destination.display()))]
pub fn convert_job(pipeline: &mut Pipeline, job: &ConversionJob) -> Result<()> {
    let source = read_source(&job.source)?;
    let blocks = pipeline.render(&source);
    debug!(blocks = blocks.len(), "rendered");

    write_document(&job.destination, &Document::new(job.title.clone(), blocks))
}

/// Render Markdown text straight to a complete HTML page.
pub fn render_document(source: &str, title: &str, config: &RenderConfig) -> String {
    Document::new(title, mdhtml_markdown::render_blocks(source, config)).to_html()
}

/// Read a source file, replacing invalid UTF-8 rather than rejecting it.
fn read_source(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| MdHtmlError::io(path, e))?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), "source is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    })
}
