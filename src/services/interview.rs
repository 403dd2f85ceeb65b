//! Interview service: CRUD within a project.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::interview::{
    CreateInterview, Interview, InterviewFilters, InterviewSummary, UpdateInterview,
};
use crate::models::pagination::{search_pattern, PagedResult, Pagination};
use crate::repositories::interview::{self as interview_repo, InterviewScope};
use crate::services::access::{self, Access};
use crate::services::project as project_service;
use crate::services::storage::FileStorage;

/// Resolve an interview's owning organization and project, then check access.
pub async fn authorize_scope(
    pool: &PgPool,
    actor: &CurrentUser,
    id: Uuid,
    level: Access,
) -> Result<InterviewScope, AppError> {
    let scope = interview_repo::find_scope(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Interview not found".to_string()))?;
    access::check(actor, scope.organization_id, level)?;
    Ok(scope)
}

pub async fn create(
    pool: &PgPool,
    actor: &CurrentUser,
    project_id: Uuid,
    input: &CreateInterview,
) -> Result<Interview, AppError> {
    input.validate()?;
    let project = project_service::authorize(pool, actor, project_id, Access::Write).await?;
    Ok(interview_repo::insert(pool, project.id, input, actor.id).await?)
}

pub async fn find_by_id(
    pool: &PgPool,
    actor: &CurrentUser,
    id: Uuid,
) -> Result<Interview, AppError> {
    authorize_scope(pool, actor, id, Access::Read).await?;
    interview_repo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Interview not found".to_string()))
}

pub async fn list(
    pool: &PgPool,
    actor: &CurrentUser,
    project_id: Uuid,
    filters: &InterviewFilters,
    pagination: &Pagination,
) -> Result<PagedResult<InterviewSummary>, AppError> {
    let project = project_service::authorize(pool, actor, project_id, Access::Read).await?;
    let pattern = search_pattern(filters.search.as_deref());
    let (items, total) =
        interview_repo::list(pool, project.id, filters.status, pattern.as_deref(), pagination)
            .await?;
    Ok(PagedResult::new(items, total, pagination))
}

pub async fn update(
    pool: &PgPool,
    actor: &CurrentUser,
    id: Uuid,
    input: &UpdateInterview,
) -> Result<Interview, AppError> {
    input.validate()?;
    authorize_scope(pool, actor, id, Access::Write).await?;
    Ok(interview_repo::update(pool, id, input).await?)
}

/// Delete an interview with its evidence rows and stored files.
pub async fn delete(
    pool: &PgPool,
    storage: &FileStorage,
    actor: &CurrentUser,
    id: Uuid,
) -> Result<(), AppError> {
    let scope = authorize_scope(pool, actor, id, Access::Manage).await?;
    if !interview_repo::delete(pool, id).await? {
        return Err(AppError::NotFound("Interview not found".to_string()));
    }
    storage
        .remove_tree(&[scope.organization_id, scope.project_id, id])
        .await;
    tracing::info!(interview_id = %id, "Interview deleted");
    Ok(())
}
