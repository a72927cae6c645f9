//! Print facilities that receive composed documents.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Local;
use thiserror::Error;
use tracing::{info, warn};

use super::composer::Document;

// Opens the browser print dialog as soon as the spooled page loads.
const PRINT_TRIGGER: &str =
    "<script>window.addEventListener('load', function () { window.print(); });</script>";

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("cannot write print spool: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to launch print viewer `{command}`: {source}")]
    Viewer {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Receives a finished document for printing.
pub trait PrintSink {
    /// Returns where the document went (a spool file, a queue name).
    fn submit(&self, document: &Document) -> Result<PathBuf, PrintError>;
}

/// Writes each document as a standalone HTML page that prints itself on
/// load, then optionally hands the page to a viewer (`xdg-open`, a browser).
pub struct HtmlSpool {
    dir: PathBuf,
    viewer: Option<String>,
}

impl HtmlSpool {
    pub fn new(dir: impl Into<PathBuf>, viewer: Option<String>) -> Self {
        Self {
            dir: dir.into(),
            viewer: viewer.filter(|v| !v.trim().is_empty()),
        }
    }

    fn launch(&self, path: &Path) -> Result<(), PrintError> {
        let Some(viewer) = &self.viewer else {
            return Ok(());
        };
        Command::new(viewer)
            .arg(path)
            .spawn()
            .map_err(|source| PrintError::Viewer {
                command: viewer.clone(),
                source,
            })?;
        Ok(())
    }
}

impl PrintSink for HtmlSpool {
    fn submit(&self, document: &Document) -> Result<PathBuf, PrintError> {
        std::fs::create_dir_all(&self.dir)?;
        let file_name = format!(
            "{}-{}.html",
            slug(&document.title),
            Local::now().format("%Y%m%d-%H%M%S%3f")
        );
        let path = self.dir.join(file_name);

        let html = match document.html.rfind("</body>") {
            Some(at) => {
                let (head, tail) = document.html.split_at(at);
                format!("{head}{PRINT_TRIGGER}\n{tail}")
            }
            None => format!("{}{PRINT_TRIGGER}", document.html),
        };
        std::fs::write(&path, html)?;
        info!(path = %path.display(), "document spooled for printing");

        if let Err(err) = self.launch(&path) {
            warn!(error = %err, "print viewer did not start");
            return Err(err);
        }
        Ok(path)
    }
}

// Lower-case ASCII alphanumerics joined by single dashes.
fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}
