// Extraction collaborator: turns an uploaded CV into an ExtractedProfileData.
//
// document:  plain text out of the uploaded bytes (PDF or text)
// extractor: the LLM call that structures that text
// payload:   shape validation and per-element parsing at the boundary

pub mod document;
pub mod extractor;
pub mod payload;
pub mod prompts;

use thiserror::Error;

use crate::llm_client::LlmError;

pub use document::{document_text, DocumentKind};
pub use extractor::{CvExtractor, LlmCvExtractor};
pub use payload::ExtractedProfileData;

#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The payload is not structurally an extraction record.
    #[error("Malformed extraction payload: {0}")]
    Malformed(String),

    #[error("Document contains no extractable text")]
    EmptyDocument,

    #[error("Unsupported document type: {0}")]
    UnsupportedFormat(String),

    #[error("Document could not be read: {0}")]
    Unreadable(String),

    #[error("Extraction call failed: {0}")]
    Llm(#[from] LlmError),
}
