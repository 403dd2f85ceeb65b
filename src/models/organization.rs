//! Organization (tenant) model.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]{1,63}$").expect("valid slug regex"));

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrganization {
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub name: String,
    #[validate(regex(
        path = *SLUG_RE,
        message = "must be 2 to 64 lower-case letters, digits or dashes"
    ))]
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateOrganization {
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Filters for listing organizations.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OrganizationFilters {
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_rules() {
        let mut org = CreateOrganization {
            name: "Acme Research".to_string(),
            slug: "acme-research".to_string(),
            description: None,
        };
        assert!(org.validate().is_ok());

        org.slug = "Acme Research".to_string();
        assert!(org.validate().is_err());

        org.slug = "a".to_string();
        assert!(org.validate().is_err());

        org.slug = "-leading-dash".to_string();
        assert!(org.validate().is_err());
    }

    #[test]
    fn update_allows_empty_patch() {
        assert!(UpdateOrganization::default().validate().is_ok());
        let blank = UpdateOrganization {
            name: Some(String::new()),
            description: None,
        };
        assert!(blank.validate().is_err());
    }
}
