//! User model with tenant membership and role-based access control.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role")]
pub enum UserRole {
    #[sqlx(rename = "Platform_Admin")]
    PlatformAdmin,
    #[sqlx(rename = "Org_Admin")]
    OrgAdmin,
    Member,
    Viewer,
}

impl UserRole {
    /// Roles that may create and edit records inside their tenant.
    pub fn can_write(&self) -> bool {
        matches!(self, Self::PlatformAdmin | Self::OrgAdmin | Self::Member)
    }

    /// Roles that may delete records, manage projects, and decide acceptance records.
    pub fn can_manage(&self) -> bool {
        matches!(self, Self::PlatformAdmin | Self::OrgAdmin)
    }
}

/// Full user row from database (includes password_hash: never serialize to API).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub organization_id: Option<Uuid>,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User response DTO: excludes password_hash and internal fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub organization_id: Option<Uuid>,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            organization_id: u.organization_id,
            username: u.username,
            email: u.email,
            display_name: u.display_name,
            role: u.role,
            is_active: u.is_active,
            last_login: u.last_login,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 64, message = "must be 3 to 64 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub display_name: String,
    pub role: UserRole,
    pub organization_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_create() -> CreateUser {
        CreateUser {
            username: "analyst".to_string(),
            email: "analyst@example.org".to_string(),
            password: "longenough".to_string(),
            display_name: "Field Analyst".to_string(),
            role: UserRole::Member,
            organization_id: Some(Uuid::nil()),
        }
    }

    #[test]
    fn user_role_serialization() {
        let json = serde_json::to_string(&UserRole::OrgAdmin).unwrap();
        assert_eq!(json, "\"OrgAdmin\"");
    }

    #[test]
    fn role_capabilities() {
        assert!(UserRole::PlatformAdmin.can_manage());
        assert!(UserRole::OrgAdmin.can_manage());
        assert!(!UserRole::Member.can_manage());
        assert!(UserRole::Member.can_write());
        assert!(!UserRole::Viewer.can_write());
    }

    #[test]
    fn user_response_excludes_password() {
        let json = serde_json::to_string(&UserResponse {
            id: Uuid::nil(),
            organization_id: None,
            username: "admin".to_string(),
            email: "admin@test.com".to_string(),
            display_name: "Admin".to_string(),
            role: UserRole::PlatformAdmin,
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
        })
        .unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("hash"));
    }

    #[test]
    fn create_user_validation() {
        assert!(sample_create().validate().is_ok());

        let mut short = sample_create();
        short.password = "short".to_string();
        assert!(short.validate().is_err());

        let mut bad_email = sample_create();
        bad_email.email = "not-an-email".to_string();
        assert!(bad_email.validate().is_err());
    }
}
