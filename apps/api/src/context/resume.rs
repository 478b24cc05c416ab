//! Résumé ingestion: turns an uploaded file into plain text that can be stored
//! as a document entry.
//!
//! PDFs go through `pdf-extract`; anything else must already be UTF-8 text.

use crate::errors::AppError;

pub const DEFAULT_RESUME_TITLE: &str = "Resume";

/// A file received from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn is_pdf(&self) -> bool {
        let by_type = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"));
        let by_name = self
            .file_name
            .as_deref()
            .is_some_and(|name| name.to_ascii_lowercase().ends_with(".pdf"));
        by_type || by_name || self.bytes.starts_with(b"%PDF-")
    }
}

/// Extracts normalized text from an uploaded résumé.
///
/// Blocking: PDF parsing is CPU-bound, callers on the runtime should use
/// `spawn_blocking`.
pub fn extract_resume_text(file: &UploadedFile) -> Result<String, AppError> {
    if file.bytes.is_empty() {
        return Err(AppError::Validation("Uploaded resume is empty".to_string()));
    }

    let raw = if file.is_pdf() {
        pdf_extract::extract_text_from_mem(&file.bytes)
            .map_err(|e| AppError::Validation(format!("Could not read PDF resume: {e}")))?
    } else {
        String::from_utf8(file.bytes.clone()).map_err(|_| {
            AppError::Validation("Resume must be a PDF or UTF-8 text file".to_string())
        })?
    };

    let text = normalize_text(&raw);
    if text.is_empty() {
        return Err(AppError::Validation(
            "No text could be extracted from the resume".to_string(),
        ));
    }
    Ok(text)
}

/// Unifies line endings, trims trailing whitespace per line and collapses
/// runs of blank lines down to one.
fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0;

    for line in raw.replace("\r\n", "\n").replace('\r', "\n").lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    out.trim().to_string()
}
