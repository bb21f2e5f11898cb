//! Core domain types shared between discovery, the batch driver and the CLI.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ConversionJob
// ---------------------------------------------------------------------------

/// One unit of batch work: a Markdown source, where its HTML goes, and the
/// page title to embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionJob {
    /// Markdown input file.
    pub source: PathBuf,
    /// HTML output file.
    pub destination: PathBuf,
    /// Opaque title string placed in `<title>`.
    pub title: String,
}

impl ConversionJob {
    /// Build a job whose title is the source file stem.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let title = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            source,
            destination: destination.into(),
            title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_defaults_to_file_stem() {
        let job = ConversionJob::new("docs/getting-started.md", "output/getting-started.html");
        assert_eq!(job.title, "getting-started");
    }

    #[test]
    fn job_serialization() {
        let job = ConversionJob::new("notes.md", "notes.html");
        let json = serde_json::to_string(&job).expect("serialize");
        let parsed: ConversionJob = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, job);
    }
}
