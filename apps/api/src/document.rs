use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Uploaded resume is empty")]
    Empty,

    #[error("Uploaded resume is not a PDF")]
    NotPdf,

    #[error("Uploaded resume is {size} bytes; the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("Could not read text from the resume PDF: {0}")]
    Extraction(String),
}

/// An uploaded resume PDF, validated but not yet parsed.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    bytes: Bytes,
    file_name: Option<String>,
}

impl ResumeDocument {
    /// Accepts an upload if it is non-empty, within `max_bytes`, and starts with the PDF header.
    pub fn from_upload(
        bytes: Bytes,
        file_name: Option<String>,
        max_bytes: usize,
    ) -> Result<Self, DocumentError> {
        if bytes.is_empty() {
            return Err(DocumentError::Empty);
        }
        if bytes.len() > max_bytes {
            return Err(DocumentError::TooLarge {
                size: bytes.len(),
                limit: max_bytes,
            });
        }
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(DocumentError::NotPdf);
        }
        Ok(Self { bytes, file_name })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Extracts the text of every page, in order.
    ///
    /// Runs on the blocking pool; a panic inside the PDF parser is reported as
    /// `DocumentError::Extraction` like any other parse failure.
    pub async fn extract_text(&self) -> Result<String, DocumentError> {
        let bytes = self.bytes.clone();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| {
                warn!("PDF extraction task failed: {e}");
                DocumentError::Extraction("the PDF parser aborted".to_string())
            })?
            .map_err(|e| DocumentError::Extraction(format!("{e:?}")))?;

        debug!(
            "Extracted {} chars from {}",
            text.len(),
            self.file_name().unwrap_or("resume")
        );
        Ok(text)
    }
}
