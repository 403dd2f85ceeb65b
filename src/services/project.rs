//! Project service: CRUD within an organization.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::pagination::{search_pattern, PagedResult, Pagination};
use crate::models::project::{CreateProject, Project, ProjectFilters, ProjectSummary, UpdateProject};
use crate::repositories::project as project_repo;
use crate::services::access::{self, Access};
use crate::services::organization as org_service;
use crate::services::storage::FileStorage;

/// Reject a date range that ends before it starts.
pub fn validate_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), AppError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(AppError::Validation(format!(
            "end_date {end} is before start_date {start}"
        ))),
        _ => Ok(()),
    }
}

/// Load a project and check the actor's access to its organization.
pub async fn authorize(
    pool: &PgPool,
    actor: &CurrentUser,
    id: Uuid,
    level: Access,
) -> Result<Project, AppError> {
    let project = project_repo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    access::check(actor, project.organization_id, level)?;
    Ok(project)
}

pub async fn create(
    pool: &PgPool,
    actor: &CurrentUser,
    organization_id: Uuid,
    input: &CreateProject,
) -> Result<Project, AppError> {
    input.validate()?;
    validate_dates(input.start_date, input.end_date)?;
    let org = org_service::authorize(pool, actor, organization_id, Access::Manage).await?;

    project_repo::insert(pool, org.id, input, actor.id)
        .await
        .map_err(|e| {
            AppError::from_write(
                e,
                format!("Project with code '{}' already exists", input.code.trim()),
            )
        })
}

pub async fn list(
    pool: &PgPool,
    actor: &CurrentUser,
    organization_id: Uuid,
    filters: &ProjectFilters,
    pagination: &Pagination,
) -> Result<PagedResult<ProjectSummary>, AppError> {
    let org = org_service::authorize(pool, actor, organization_id, Access::Read).await?;
    let pattern = search_pattern(filters.search.as_deref());
    let (items, total) =
        project_repo::list(pool, org.id, filters.status, pattern.as_deref(), pagination).await?;
    Ok(PagedResult::new(items, total, pagination))
}

pub async fn update(
    pool: &PgPool,
    actor: &CurrentUser,
    id: Uuid,
    input: &UpdateProject,
) -> Result<Project, AppError> {
    input.validate()?;
    let existing = authorize(pool, actor, id, Access::Manage).await?;
    validate_dates(
        input.start_date.or(existing.start_date),
        input.end_date.or(existing.end_date),
    )?;

    project_repo::update(pool, existing.id, input)
        .await
        .map_err(|e| AppError::from_write(e, "Project code already exists in this organization"))
}

/// Delete a project and everything beneath it, including stored evidence files.
pub async fn delete(
    pool: &PgPool,
    storage: &FileStorage,
    actor: &CurrentUser,
    id: Uuid,
) -> Result<(), AppError> {
    let project = authorize(pool, actor, id, Access::Manage).await?;
    if !project_repo::delete(pool, project.id).await? {
        return Err(AppError::NotFound("Project not found".to_string()));
    }
    storage
        .remove_tree(&[project.organization_id, project.id])
        .await;
    tracing::info!(project_id = %project.id, "Project deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn date_range_rules() {
        assert!(validate_dates(None, None).is_ok());
        assert!(validate_dates(Some(date("2026-01-01")), None).is_ok());
        assert!(validate_dates(Some(date("2026-01-01")), Some(date("2026-01-01"))).is_ok());
        assert!(matches!(
            validate_dates(Some(date("2026-02-01")), Some(date("2026-01-01"))),
            Err(AppError::Validation(_))
        ));
    }
}
