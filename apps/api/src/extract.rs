//! Resume document intake: upload validation and plain-text extraction.
//!
//! PDF parsing is CPU-bound and must run inside `tokio::task::spawn_blocking`.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_TEXT: &str = "text/plain";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file type '{0}'. Please upload a PDF or Word document.")]
    UnsupportedFileType(String),

    #[error("File is {size} bytes; the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("Uploaded file is empty")]
    Empty,

    #[error("Text extraction is not available for {0} documents")]
    NoExtractor(DocumentKind),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("Document is not valid UTF-8 text")]
    InvalidText,

    #[error("No text could be extracted from the document")]
    NoText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
    PlainText,
}

impl DocumentKind {
    /// Resolves the kind from a MIME type, ignoring parameters such as `; charset=utf-8`.
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            MIME_PDF => Some(DocumentKind::Pdf),
            MIME_DOC => Some(DocumentKind::Doc),
            MIME_DOCX => Some(DocumentKind::Docx),
            MIME_TEXT => Some(DocumentKind::PlainText),
            _ => None,
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "doc" => Some(DocumentKind::Doc),
            "docx" => Some(DocumentKind::Docx),
            "txt" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Doc => "DOC",
            DocumentKind::Docx => "DOCX",
            DocumentKind::PlainText => "plain text",
        };
        f.write_str(name)
    }
}

/// A resume file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedDocument {
    /// Checks type and size against the upload rules and returns the document kind.
    ///
    /// The declared MIME type wins; the file extension is consulted only when
    /// the client sent no type or a generic `application/octet-stream`.
    pub fn validate(&self, max_bytes: usize) -> Result<DocumentKind, DocumentError> {
        let declared = self
            .content_type
            .as_deref()
            .filter(|ct| !ct.trim().is_empty() && !ct.starts_with("application/octet-stream"));

        let kind = match declared {
            Some(ct) => DocumentKind::from_mime(ct)
                .ok_or_else(|| DocumentError::UnsupportedFileType(ct.to_string()))?,
            None => DocumentKind::from_file_name(&self.file_name)
                .ok_or_else(|| DocumentError::UnsupportedFileType(self.file_name.clone()))?,
        };

        if self.data.is_empty() {
            return Err(DocumentError::Empty);
        }
        if self.data.len() > max_bytes {
            return Err(DocumentError::TooLarge {
                size: self.data.len(),
                limit: max_bytes,
            });
        }
        Ok(kind)
    }
}

/// Converts an accepted document into plain resume text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(
        &self,
        kind: DocumentKind,
        document: &UploadedDocument,
    ) -> Result<String, DocumentError>;
}

/// Default extractor: PDF through `pdf-extract`, UTF-8 plain text as-is.
/// Word formats have no extractor.
pub struct DocumentTextExtractor;

#[async_trait]
impl TextExtractor for DocumentTextExtractor {
    async fn extract(
        &self,
        kind: DocumentKind,
        document: &UploadedDocument,
    ) -> Result<String, DocumentError> {
        let text = match kind {
            DocumentKind::Pdf => {
                let data = document.data.clone();
                tokio::task::spawn_blocking(move || {
                    pdf_extract::extract_text_from_mem(&data).map_err(|e| e.to_string())
                })
                .await
                .map_err(|e| DocumentError::Pdf(format!("extraction task failed: {e}")))?
                .map_err(DocumentError::Pdf)?
            }
            DocumentKind::PlainText => String::from_utf8(document.data.to_vec())
                .map_err(|_| DocumentError::InvalidText)?,
            DocumentKind::Doc | DocumentKind::Docx => {
                return Err(DocumentError::NoExtractor(kind));
            }
        };

        if text.trim().is_empty() {
            return Err(DocumentError::NoText);
        }
        debug!(
            "Extracted {} chars from {} '{}'",
            text.len(),
            kind,
            document.file_name
        );
        Ok(text)
    }
}
