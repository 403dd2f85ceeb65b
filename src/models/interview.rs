//! Interview model: a recorded conversation inside a project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "interview_status")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interview {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub interviewee_name: String,
    pub interviewee_role: Option<String>,
    pub interviewer_name: Option<String>,
    pub conducted_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub status: InterviewStatus,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInterview {
    #[validate(length(min = 1, max = 300, message = "must be 1 to 300 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub interviewee_name: String,
    pub interviewee_role: Option<String>,
    pub interviewer_name: Option<String>,
    pub conducted_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub status: Option<InterviewStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateInterview {
    #[validate(length(min = 1, max = 300, message = "must be 1 to 300 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub interviewee_name: Option<String>,
    pub interviewee_role: Option<String>,
    pub interviewer_name: Option<String>,
    pub conducted_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub status: Option<InterviewStatus>,
    pub notes: Option<String>,
}

/// Summary DTO for list views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewSummary {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub interviewee_name: String,
    pub interviewer_name: Option<String>,
    pub conducted_at: Option<DateTime<Utc>>,
    pub status: InterviewStatus,
    pub evidence_count: i64,
}

/// Filters for listing interviews.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct InterviewFilters {
    pub status: Option<InterviewStatus>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_interview_requires_interviewee() {
        let input: CreateInterview = serde_json::from_str(
            r#"{"title":"Stakeholder kickoff","interviewee_name":""}"#,
        )
        .unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn create_interview_parses_timestamp() {
        let input: CreateInterview = serde_json::from_str(
            r#"{"title":"Kickoff","interviewee_name":"R. Osei","conducted_at":"2026-03-02T09:30:00Z"}"#,
        )
        .unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(input.conducted_at.unwrap().to_rfc3339(), "2026-03-02T09:30:00+00:00");
    }
}
