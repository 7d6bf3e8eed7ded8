//! Document readers
//!
//! Turns a file or an uploaded byte buffer into UTF-8 text for the
//! extractor. PDF extraction is not provided here; implement
//! [`DocumentReader`] over a PDF library to add it.

use crate::error::TrackerError;
use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Where document text comes from
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Path(PathBuf),
    Bytes { name: String, data: Vec<u8> },
}

impl DocumentSource {
    pub fn name(&self) -> String {
        match self {
            DocumentSource::Path(path) => path.display().to_string(),
            DocumentSource::Bytes { name, .. } => name.clone(),
        }
    }
}

impl From<&Path> for DocumentSource {
    fn from(path: &Path) -> Self {
        DocumentSource::Path(path.to_path_buf())
    }
}

/// Trait for anything that can produce agreement text
#[async_trait]
pub trait DocumentReader: Send + Sync {
    async fn read_text(&self, source: &DocumentSource) -> Result<String>;
}

/// Reads UTF-8 text files and buffers; reports PDFs as unsupported
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextReader;

#[async_trait]
impl DocumentReader for PlainTextReader {
    async fn read_text(&self, source: &DocumentSource) -> Result<String> {
        let name = source.name();

        let data = match source {
            DocumentSource::Path(path) => {
                if has_pdf_extension(path) {
                    return Err(unsupported_pdf(&name));
                }
                tokio::fs::read(path).await?
            }
            DocumentSource::Bytes { data, .. } => data.clone(),
        };

        if data.starts_with(PDF_MAGIC) {
            return Err(unsupported_pdf(&name));
        }

        let text = String::from_utf8(data).map_err(|e| {
            warn!(source = %name, "Document is not valid UTF-8");
            TrackerError::Read(format!("{} is not valid UTF-8: {}", name, e))
        })?;

        debug!(source = %name, chars = text.chars().count(), "Read document");
        Ok(text)
    }
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn unsupported_pdf(name: &str) -> TrackerError {
    TrackerError::UnsupportedFormat(format!(
        "{}: PDF text extraction needs a PDF-capable DocumentReader",
        name
    ))
}

/// Read a file with the plain-text reader
pub async fn read_file_content(path: impl AsRef<Path>) -> Result<String> {
    PlainTextReader
        .read_text(&DocumentSource::from(path.as_ref()))
        .await
}
