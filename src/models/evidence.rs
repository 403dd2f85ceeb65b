//! Evidence model: a stored file attached to an interview under a sequential code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Evidence {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub original_filename: String,
    /// Path relative to the upload root; internal only.
    #[serde(skip_serializing, default)]
    pub stored_path: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub sha256: String,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row data for a new evidence record, assembled after the file is stored.
#[derive(Debug, Clone)]
pub struct NewEvidence {
    pub interview_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub original_filename: String,
    pub stored_path: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub sha256: String,
    pub uploaded_by: Uuid,
}

/// File columns replaced when a new version of the evidence file is uploaded.
#[derive(Debug, Clone)]
pub struct ReplacementFile {
    pub original_filename: String,
    pub stored_path: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub sha256: String,
    pub uploaded_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateEvidence {
    #[validate(length(min = 1, max = 300, message = "must be 1 to 300 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Summary DTO for list views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EvidenceSummary {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub code: String,
    pub title: String,
    pub original_filename: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// Filters for listing evidence.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EvidenceFilters {
    pub search: Option<String>,
}

/// Preview of the code the next upload to an interview would receive.
#[derive(Debug, Clone, Serialize)]
pub struct NextEvidenceCode {
    pub interview_id: Uuid,
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evidence_never_serializes_stored_path() {
        let evidence = Evidence {
            id: Uuid::nil(),
            interview_id: Uuid::nil(),
            code: "EV-001".to_string(),
            title: "Signed consent".to_string(),
            description: None,
            original_filename: "consent.pdf".to_string(),
            stored_path: "org/project/interview/file.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            size_bytes: 1024,
            sha256: "ab".repeat(32),
            uploaded_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&evidence).unwrap();
        assert!(json.get("stored_path").is_none());
        assert_eq!(json["code"], "EV-001");
    }
}
