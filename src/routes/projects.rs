//! Project routes: CRUD and search within an organization.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireManager;
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::project::{CreateProject, Project, ProjectFilters, ProjectSummary, UpdateProject};
use crate::routes::Deleted;
use crate::services::access::Access;
use crate::services::project as project_service;
use crate::AppState;

/// GET /api/v1/organizations/{id}/projects
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(org_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<ProjectFilters>,
) -> Result<Json<ApiResponse<PagedResult<ProjectSummary>>>, AppError> {
    let result =
        project_service::list(&state.db, &current_user, org_id, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/organizations/{id}/projects (manager+)
pub async fn create(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(org_id): Path<Uuid>,
    Json(body): Json<CreateProject>,
) -> Result<Json<ApiResponse<Project>>, AppError> {
    let project = project_service::create(&state.db, &manager, org_id, &body).await?;
    Ok(ApiResponse::success(project))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Project>>, AppError> {
    let project = project_service::authorize(&state.db, &current_user, id, Access::Read).await?;
    Ok(ApiResponse::success(project))
}

/// PUT /api/v1/projects/{id} (manager+)
pub async fn update(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProject>,
) -> Result<Json<ApiResponse<Project>>, AppError> {
    let project = project_service::update(&state.db, &manager, id, &body).await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /api/v1/projects/{id} (manager+)
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Deleted>>, AppError> {
    project_service::delete(&state.db, &state.storage, &manager, id).await?;
    Ok(ApiResponse::success(Deleted { id }))
}
