//! Organization routes: tenant CRUD and search.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::{RequireAdmin, RequireManager};
use crate::models::organization::{
    CreateOrganization, Organization, OrganizationFilters, UpdateOrganization,
};
use crate::models::pagination::{PagedResult, Pagination};
use crate::routes::Deleted;
use crate::services::access::Access;
use crate::services::organization as org_service;
use crate::AppState;

/// GET /api/v1/organizations: list visible organizations.
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<OrganizationFilters>,
) -> Result<Json<ApiResponse<PagedResult<Organization>>>, AppError> {
    let result = org_service::list(&state.db, &current_user, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/organizations: create an organization (platform admin).
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CreateOrganization>,
) -> Result<Json<ApiResponse<Organization>>, AppError> {
    let org = org_service::create(&state.db, &body).await?;
    Ok(ApiResponse::success(org))
}

/// GET /api/v1/organizations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Organization>>, AppError> {
    let org = org_service::authorize(&state.db, &current_user, id, Access::Read).await?;
    Ok(ApiResponse::success(org))
}

/// PUT /api/v1/organizations/{id}: update (org admin of it, or platform admin).
pub async fn update(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateOrganization>,
) -> Result<Json<ApiResponse<Organization>>, AppError> {
    let org = org_service::update(&state.db, &manager, id, &body).await?;
    Ok(ApiResponse::success(org))
}

/// DELETE /api/v1/organizations/{id}: delete with all contents (platform admin).
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Deleted>>, AppError> {
    org_service::delete(&state.db, &state.storage, id).await?;
    Ok(ApiResponse::success(Deleted { id }))
}
