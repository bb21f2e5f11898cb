//! HTML document assembler.
//!
//! Wraps transformed blocks with page boilerplate and writes the result to
//! disk.

use std::path::Path;

use tracing::{debug, instrument};

use mdhtml_shared::{MdHtmlError, Result};

/// A rendered document: transformed blocks plus the caller-supplied title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Text placed in `<title>`.
    pub title: String,
    /// Transformed blocks in source order.
    pub blocks: Vec<String>,
}

impl Document {
    pub fn new(title: impl Into<String>, blocks: Vec<String>) -> Self {
        Self {
            title: title.into(),
            blocks,
        }
    }

    /// Produce the full HTML page.
    ///
    /// ```text
    /// <html>
    /// <head>
    /// <meta http-equiv="Content-Type" content="text/html; charset=utf-8" />
    /// <title>...</title>
    /// </head>
    ///
    /// <body>
    /// block
    ///
    /// block
    ///
    /// </body>
    /// </html>
    /// ```
    pub fn to_html(&self) -> String {
        let body_len: usize = self.blocks.iter().map(|b| b.len() + 2).sum();
        let mut html = String::with_capacity(body_len + 256);

        html.push_str("<html>\n<head>\n");
        html.push_str("<meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\" />\n");
        html.push_str("<title>");
        html.push_str(&html_escape::encode_text(&self.title));
        html.push_str("</title>\n");
        html.push_str("</head>\n\n<body>\n");

        for block in &self.blocks {
            html.push_str(block);
            html.push_str("\n\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

/// Write a document to `path`, creating parent directories as needed.
///
/// The page is written to a temp file next to the target and renamed into
/// place, so a failed write never leaves a truncated page behind.
#[instrument(skip_all, fields(path = %path.display(), blocks = document.blocks.len()))]
pub fn write_document(path: &Path, document: &Document) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MdHtmlError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| MdHtmlError::validation(format!("{} has no file name", path.display())))?;
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, document.to_html()).map_err(|e| MdHtmlError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp);
        MdHtmlError::io(path, e)
    })?;

    debug!("document written");
    Ok(())
}
