//! Organization service: tenant CRUD.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::organization::{
    CreateOrganization, Organization, OrganizationFilters, UpdateOrganization,
};
use crate::models::pagination::{search_pattern, PagedResult, Pagination};
use crate::repositories::organization as org_repo;
use crate::services::access::{self, Access};
use crate::services::storage::FileStorage;

/// Create a new organization (platform admin only, enforced by the route).
pub async fn create(pool: &PgPool, input: &CreateOrganization) -> Result<Organization, AppError> {
    input.validate()?;
    let org = org_repo::insert(pool, input).await.map_err(|e| {
        AppError::from_write(
            e,
            format!("Organization '{}' or slug '{}' already exists", input.name, input.slug),
        )
    })?;
    tracing::info!(organization_id = %org.id, slug = %org.slug, "Organization created");
    Ok(org)
}

/// Load an organization without access checks.
pub async fn load(pool: &PgPool, id: Uuid) -> Result<Organization, AppError> {
    org_repo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))
}

/// Load an organization and check the actor's access to it.
pub async fn authorize(
    pool: &PgPool,
    actor: &CurrentUser,
    id: Uuid,
    level: Access,
) -> Result<Organization, AppError> {
    let org = load(pool, id).await?;
    access::check(actor, org.id, level)?;
    Ok(org)
}

pub async fn list(
    pool: &PgPool,
    actor: &CurrentUser,
    filters: &OrganizationFilters,
    pagination: &Pagination,
) -> Result<PagedResult<Organization>, AppError> {
    let pattern = search_pattern(filters.search.as_deref());
    let (items, total) =
        org_repo::list(pool, actor.tenant_filter(), pattern.as_deref(), pagination).await?;
    Ok(PagedResult::new(items, total, pagination))
}

pub async fn update(
    pool: &PgPool,
    actor: &CurrentUser,
    id: Uuid,
    input: &UpdateOrganization,
) -> Result<Organization, AppError> {
    input.validate()?;
    let existing = authorize(pool, actor, id, Access::Manage).await?;
    org_repo::update(pool, existing.id, input)
        .await
        .map_err(|e| AppError::from_write(e, "Organization name already exists"))
}

/// Delete an organization with everything beneath it, including stored files.
pub async fn delete(pool: &PgPool, storage: &FileStorage, id: Uuid) -> Result<(), AppError> {
    if !org_repo::delete(pool, id).await? {
        return Err(AppError::NotFound("Organization not found".to_string()));
    }
    storage.remove_tree(&[id]).await;
    tracing::info!(organization_id = %id, "Organization deleted");
    Ok(())
}
