//! Input discovery: turns a path given on the command line into conversion
//! jobs.
//!
//! A single file converts next to itself. A directory is scanned one level
//! deep for Markdown files, which are converted into the output directory.

use std::path::{Path, PathBuf};

use mdhtml_shared::{ConversionJob, DefaultsConfig, MdHtmlError, Result};
use tracing::{debug, info, instrument};

/// Extension given to every generated page.
const HTML_EXTENSION: &str = "html";

// ---------------------------------------------------------------------------
// Discovery options
// ---------------------------------------------------------------------------

/// Configuration for the discovery process.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Where pages from a directory input are written.
    pub output_dir: PathBuf,
    /// Source extensions accepted from a directory, without the dot.
    pub extensions: Vec<String>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        DefaultsConfig::default().into()
    }
}

impl From<DefaultsConfig> for DiscoveryOptions {
    fn from(defaults: DefaultsConfig) -> Self {
        Self {
            output_dir: PathBuf::from(defaults.output_dir),
            extensions: defaults.extensions,
        }
    }
}

impl DiscoveryOptions {
    /// Whether `path` carries one of the accepted extensions, ignoring case.
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Build the job list for `input`.
///
/// Files are taken as-is regardless of extension. Directory entries are
/// filtered by extension, subdirectories are skipped, and the result is
/// sorted by source path.
#[instrument(skip_all, fields(input = %input.display()))]
pub fn discover(input: &Path, opts: &DiscoveryOptions) -> Result<Vec<ConversionJob>> {
    let metadata = std::fs::metadata(input).map_err(|e| {
        MdHtmlError::discovery(format!("cannot access {}: {e}", input.display()))
    })?;

    if metadata.is_file() {
        let job = ConversionJob::new(input, input.with_extension(HTML_EXTENSION));
        debug!(destination = %job.destination.display(), "single file input");
        return Ok(vec![job]);
    }

    if !metadata.is_dir() {
        return Err(MdHtmlError::discovery(format!(
            "{} is neither a file nor a directory",
            input.display()
        )));
    }

    let entries = std::fs::read_dir(input).map_err(|e| MdHtmlError::io(input, e))?;

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MdHtmlError::io(input, e))?;
        let path = entry.path();
        let is_file = entry
            .file_type()
            .map(|t| t.is_file())
            .map_err(|e| MdHtmlError::io(&path, e))?;
        if is_file && opts.accepts(&path) {
            sources.push(path);
        } else {
            debug!(path = %path.display(), "skipping entry");
        }
    }
    sources.sort();

    let jobs: Vec<ConversionJob> = sources
        .into_iter()
        .map(|source| {
            let destination = destination_in(&opts.output_dir, &source);
            ConversionJob::new(source, destination)
        })
        .collect();

    info!(count = jobs.len(), output_dir = %opts.output_dir.display(), "directory scanned");
    Ok(jobs)
}

/// `<output_dir>/<stem>.html`.
fn destination_in(output_dir: &Path, source: &Path) -> PathBuf {
    let stem = source.file_stem().unwrap_or_default().to_string_lossy();
    output_dir.join(format!("{stem}.{HTML_EXTENSION}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "# x\n").unwrap();
        path
    }

    fn opts(output_dir: &Path) -> DiscoveryOptions {
        DiscoveryOptions {
            output_dir: output_dir.to_path_buf(),
            ..DiscoveryOptions::default()
        }
    }

    #[test]
    fn single_file_converts_in_place() {
        let tmp = tempfile::tempdir().unwrap();
        let src = touch(tmp.path(), "notes.md");

        let jobs = discover(&src, &opts(Path::new("unused"))).unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].source, src);
        assert_eq!(jobs[0].destination, tmp.path().join("notes.html"));
        assert_eq!(jobs[0].title, "notes");
    }

    #[test]
    fn single_file_ignores_extension_filter() {
        let tmp = tempfile::tempdir().unwrap();
        let src = touch(tmp.path(), "README.txt");

        let jobs = discover(&src, &opts(tmp.path())).unwrap();
        assert_eq!(jobs[0].destination, tmp.path().join("README.html"));
    }

    #[test]
    fn directory_is_filtered_and_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "b.md");
        touch(tmp.path(), "a.markdown");
        touch(tmp.path(), "C.MD");
        touch(tmp.path(), "image.png");
        touch(tmp.path(), "noext");
        std::fs::create_dir(tmp.path().join("sub.md")).unwrap();
        touch(&tmp.path().join("sub.md"), "nested.md");

        let out = tmp.path().join("html");
        let jobs = discover(tmp.path(), &opts(&out)).unwrap();

        let titles: Vec<&str> = jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "a", "b"]);
        assert_eq!(jobs[1].destination, out.join("a.html"));
        assert!(jobs.iter().all(|j| j.destination.starts_with(&out)));
    }

    #[test]
    fn dotted_stem_keeps_its_dots() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "release-1.2.md");
        let out = tmp.path().join("html");

        let jobs = discover(tmp.path(), &opts(&out)).unwrap();
        assert_eq!(jobs[0].destination, out.join("release-1.2.html"));
    }

    #[test]
    fn empty_directory_yields_no_jobs() {
        let tmp = tempfile::tempdir().unwrap();
        let jobs = discover(tmp.path(), &opts(tmp.path())).unwrap();
        assert!(jobs.is_empty());
    }

    #[test]
    fn missing_input_is_discovery_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = discover(&tmp.path().join("absent.md"), &opts(tmp.path())).unwrap_err();
        assert!(matches!(err, MdHtmlError::Discovery { .. }));
    }

    #[test]
    fn accepts_is_case_insensitive_and_dot_tolerant() {
        let opts = DiscoveryOptions {
            output_dir: PathBuf::from("out"),
            extensions: vec![".md".into(), "mdown".into()],
        };
        assert!(opts.accepts(Path::new("x.MD")));
        assert!(opts.accepts(Path::new("x.mdown")));
        assert!(!opts.accepts(Path::new("x.markdown")));
        assert!(!opts.accepts(Path::new("md")));
    }

    #[test]
    fn options_follow_config_defaults() {
        let opts = DiscoveryOptions::default();
        assert_eq!(opts.output_dir, PathBuf::from("output"));
        assert_eq!(opts.extensions, vec!["md", "markdown", "mdown"]);
    }
}
