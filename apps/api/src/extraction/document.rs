use bytes::Bytes;
use tracing::debug;

use crate::extraction::ExtractionError;

/// Uploaded CV formats we can pull text out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Picks the format from the declared content type, falling back to the
    /// file name and finally to the PDF magic bytes.
    pub fn detect(
        content_type: Option<&str>,
        file_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<Self, ExtractionError> {
        let mime = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_lowercase())
            .unwrap_or_default();
        match mime.as_str() {
            "application/pdf" => return Ok(DocumentKind::Pdf),
            "text/plain" => return Ok(DocumentKind::PlainText),
            _ => {}
        }

        let extension = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase());
        match extension.as_deref() {
            Some("pdf") => return Ok(DocumentKind::Pdf),
            Some("txt") => return Ok(DocumentKind::PlainText),
            _ => {}
        }

        if bytes.starts_with(b"%PDF") {
            return Ok(DocumentKind::Pdf);
        }

        let declared = if mime.is_empty() {
            file_name.unwrap_or("unknown").to_string()
        } else {
            mime
        };
        Err(ExtractionError::UnsupportedFormat(declared))
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::PlainText => "txt",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::PlainText => "text/plain",
        }
    }
}

/// Extracts the CV text. PDF parsing is CPU-bound and runs on the blocking pool.
pub async fn document_text(kind: DocumentKind, bytes: Bytes) -> Result<String, ExtractionError> {
    let text = match kind {
        DocumentKind::Pdf => tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes)
                .map_err(|e| ExtractionError::Unreadable(e.to_string()))
        })
        .await
        .map_err(|e| ExtractionError::Unreadable(format!("PDF worker failed: {e}")))??,
        DocumentKind::PlainText => String::from_utf8(bytes.to_vec())
            .map_err(|_| ExtractionError::Unreadable("text is not valid UTF-8".to_string()))?,
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(ExtractionError::EmptyDocument);
    }
    debug!(chars = text.len(), ?kind, "Extracted CV text");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_prefers_content_type() {
        let kind =
            DocumentKind::detect(Some("application/pdf; charset=binary"), Some("cv.txt"), b"");
        assert_eq!(kind.unwrap(), DocumentKind::Pdf);
    }

    #[test]
    fn test_detect_falls_back_to_extension_and_magic() {
        let by_name = DocumentKind::detect(Some("application/octet-stream"), Some("CV.PDF"), b"");
        assert_eq!(by_name.unwrap(), DocumentKind::Pdf);

        let by_magic = DocumentKind::detect(None, None, b"%PDF-1.7\n");
        assert_eq!(by_magic.unwrap(), DocumentKind::Pdf);
    }

    #[test]
    fn test_detect_rejects_word_documents() {
        let err = DocumentKind::detect(
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            Some("cv.docx"),
            b"PK\x03\x04",
        )
        .unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_plain_text_is_trimmed() {
        let text = document_text(DocumentKind::PlainText, Bytes::from_static(b"  Ada Lovelace\n"))
            .await
            .unwrap();
        assert_eq!(text, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_blank_document_is_rejected() {
        let err = document_text(DocumentKind::PlainText, Bytes::from_static(b" \n\t "))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::EmptyDocument));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_unreadable() {
        let err = document_text(DocumentKind::PlainText, Bytes::from_static(&[0xff, 0xfe, 0x00]))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Unreadable(_)));
    }
}
