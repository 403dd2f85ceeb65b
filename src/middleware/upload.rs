//! Multipart upload extractor with size enforcement.
//!
//! Streams the `file` part chunk by chunk so an oversized upload is rejected
//! as soon as it crosses `UPLOAD_MAX_BYTES`. Other parts are collected as
//! text fields.

use std::collections::HashMap;

use axum::extract::{FromRequest, Multipart, Request};

use crate::errors::AppError;
use crate::AppState;

/// Name of the multipart part carrying the file bytes.
pub const FILE_FIELD: &str = "file";

/// A file received in a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Parsed multipart body: at most one file plus any text fields.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Consume a multipart stream, failing with `PayloadTooLarge` past `max_bytes`.
    pub async fn from_multipart(mut multipart: Multipart, max_bytes: usize) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name == FILE_FIELD {
                if form.file.is_some() {
                    return Err(AppError::Validation(
                        "Only one 'file' part is accepted".to_string(),
                    ));
                }
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(|s| s.to_string());
                let mut bytes = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?
                {
                    if bytes.len() + chunk.len() > max_bytes {
                        return Err(AppError::PayloadTooLarge(format!(
                            "File exceeds the {max_bytes} byte limit"
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                form.file = Some(UploadedFile {
                    filename,
                    content_type,
                    bytes,
                });
            } else if !name.is_empty() {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    /// Take the file part or fail with a validation error.
    pub fn require_file(&mut self) -> Result<UploadedFile, AppError> {
        self.file.take().ok_or_else(|| {
            AppError::Validation("Missing 'file' field in multipart request".to_string())
        })
    }

    /// A trimmed, non-empty text field.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

impl FromRequest<AppState> for UploadForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(format!("Expected multipart/form-data: {e}")))?;
        UploadForm::from_multipart(multipart, state.config.upload_max_bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_trims_and_skips_blank() {
        let mut form = UploadForm::default();
        form.fields.insert("title".to_string(), "  Consent form ".to_string());
        form.fields.insert("description".to_string(), "   ".to_string());
        assert_eq!(form.text("title").as_deref(), Some("Consent form"));
        assert_eq!(form.text("description"), None);
        assert_eq!(form.text("missing"), None);
    }

    #[test]
    fn require_file_reports_missing_part() {
        let mut form = UploadForm::default();
        assert!(matches!(form.require_file(), Err(AppError::Validation(_))));

        form.file = Some(UploadedFile {
            filename: "a.txt".to_string(),
            content_type: None,
            bytes: b"hi".to_vec(),
        });
        assert_eq!(form.require_file().unwrap().filename, "a.txt");
        assert!(form.file.is_none());
    }
}
