use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;

pub const PDF_MIME: &str = "application/pdf";
pub const PDF_ONLY_MESSAGE: &str = "Only PDF files are allowed.";

/// A CV held in memory for the lifetime of a session.
///
/// `revision` is assigned by the file holder when the file is stored and is
/// what file-mode searches compare against to detect a replaced upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub payload: Bytes,
    pub revision: u64,
    pub received_at: DateTime<Utc>,
}

impl UploadedFile {
    /// Accepts only non-empty PDFs, by MIME type or `.pdf` suffix.
    /// Rejection happens before anything is stored or sent.
    pub fn from_upload(
        name: impl Into<String>,
        content_type: Option<&str>,
        payload: Bytes,
    ) -> Result<Self, AppError> {
        let name = name.into();
        let is_pdf = content_type.is_some_and(|ct| ct.eq_ignore_ascii_case(PDF_MIME))
            || name.to_ascii_lowercase().ends_with(".pdf");
        if !is_pdf || payload.is_empty() {
            return Err(AppError::Validation(PDF_ONLY_MESSAGE.to_string()));
        }

        Ok(Self {
            name,
            content_type: PDF_MIME.to_string(),
            payload,
            revision: 0,
            received_at: Utc::now(),
        })
    }

    pub fn size(&self) -> usize {
        self.payload.len()
    }

    pub fn metadata(&self) -> UploadedFileInfo {
        UploadedFileInfo {
            name: self.name.clone(),
            size: self.size(),
            content_type: self.content_type.clone(),
            revision: self.revision,
            received_at: self.received_at,
        }
    }
}

/// Payload-free view of an upload, safe to return to clients.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFileInfo {
    pub name: String,
    pub size: usize,
    pub content_type: String,
    pub revision: u64,
    pub received_at: DateTime<Utc>,
}
