//! Acceptance record model: a stakeholder sign-off tracked against a project.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "acceptance_status")]
pub enum AcceptanceStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AcceptanceRecord {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub criteria: Option<String>,
    pub status: AcceptanceStatus,
    pub stakeholder_name: Option<String>,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_notes: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAcceptanceRecord {
    #[validate(length(min = 1, max = 300, message = "must be 1 to 300 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub criteria: Option<String>,
    pub stakeholder_name: Option<String>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateAcceptanceRecord {
    #[validate(length(min = 1, max = 300, message = "must be 1 to 300 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub criteria: Option<String>,
    pub stakeholder_name: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Request body for recording a decision on an acceptance record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptanceDecision {
    pub status: AcceptanceStatus,
    pub notes: Option<String>,
}

/// Summary DTO for list views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AcceptanceRecordSummary {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub status: AcceptanceStatus,
    pub stakeholder_name: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub decided_at: Option<DateTime<Utc>>,
}

/// Filters for listing acceptance records.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AcceptanceFilters {
    pub status: Option<AcceptanceStatus>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_parses_status() {
        let d: AcceptanceDecision =
            serde_json::from_str(r#"{"status":"Rejected","notes":"Missing signatures"}"#).unwrap();
        assert_eq!(d.status, AcceptanceStatus::Rejected);
        assert_eq!(d.notes.as_deref(), Some("Missing signatures"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let d = serde_json::from_str::<AcceptanceDecision>(r#"{"status":"Maybe"}"#);
        assert!(d.is_err());
    }
}
