use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Turns an uploaded résumé into plain text.
#[async_trait]
pub trait ResumeExtractor: Send + Sync {
    async fn extract(&self, file: Bytes) -> Result<String, AppError>;
}

/// Default extractor backed by `pdf-extract`. Parsing runs on the blocking pool.
pub struct PdfTextExtractor;

#[async_trait]
impl ResumeExtractor for PdfTextExtractor {
    async fn extract(&self, file: Bytes) -> Result<String, AppError> {
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&file))
            .await
            .map_err(|e| AppError::Extraction(format!("extraction task failed: {e}")))?
            .map_err(|e| AppError::Extraction(e.to_string()))?;

        debug!("Extracted {} characters of resume text", text.len());
        Ok(text)
    }
}

/// Rejects empty uploads and files that do not carry a PDF header.
pub fn validate_pdf(file: &[u8]) -> Result<(), AppError> {
    if file.is_empty() {
        return Err(AppError::Validation("Uploaded resume file is empty.".to_string()));
    }
    // Some producers emit a few bytes of junk before the header.
    let head = &file[..file.len().min(1024)];
    if !head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        return Err(AppError::Validation(
            "Resume must be a PDF file.".to_string(),
        ));
    }
    Ok(())
}
