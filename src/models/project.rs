//! Project model: the unit of work inside an organization.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "project_status")]
pub enum ProjectStatus {
    Active,
    #[sqlx(rename = "On_Hold")]
    OnHold,
    Completed,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 32, message = "must be 1 to 32 characters"))]
    pub code: String,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 32, message = "must be 1 to 32 characters"))]
    pub code: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Summary DTO for list views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub code: String,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub interview_count: i64,
}

/// Filters for listing projects.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectFilters {
    pub status: Option<ProjectStatus>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_status_serialization() {
        let json = serde_json::to_string(&ProjectStatus::OnHold).unwrap();
        assert_eq!(json, "\"OnHold\"");
    }

    #[test]
    fn create_project_from_minimal_json() {
        let input: CreateProject =
            serde_json::from_str(r#"{"name":"Onboarding study","code":"ONB-24"}"#).unwrap();
        assert!(input.validate().is_ok());
        assert!(input.status.is_none());
        assert!(input.start_date.is_none());
    }

    #[test]
    fn create_project_rejects_long_code() {
        let input = CreateProject {
            name: "Study".to_string(),
            code: "X".repeat(33),
            description: None,
            status: None,
            start_date: None,
            end_date: None,
        };
        assert!(input.validate().is_err());
    }
}
