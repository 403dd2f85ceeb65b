//! Acceptance record routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::{RequireManager, RequireWriter};
use crate::models::acceptance::{
    AcceptanceDecision, AcceptanceFilters, AcceptanceRecord, AcceptanceRecordSummary,
    CreateAcceptanceRecord, UpdateAcceptanceRecord,
};
use crate::models::pagination::{PagedResult, Pagination};
use crate::routes::Deleted;
use crate::services::acceptance as acceptance_service;
use crate::AppState;

/// GET /api/v1/projects/{id}/acceptance-records
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(project_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<AcceptanceFilters>,
) -> Result<Json<ApiResponse<PagedResult<AcceptanceRecordSummary>>>, AppError> {
    let result =
        acceptance_service::list(&state.db, &current_user, project_id, &filters, &pagination)
            .await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/projects/{id}/acceptance-records
pub async fn create(
    State(state): State<AppState>,
    RequireWriter(writer): RequireWriter,
    Path(project_id): Path<Uuid>,
    Json(body): Json<CreateAcceptanceRecord>,
) -> Result<Json<ApiResponse<AcceptanceRecord>>, AppError> {
    let record = acceptance_service::create(&state.db, &writer, project_id, &body).await?;
    Ok(ApiResponse::success(record))
}

/// GET /api/v1/acceptance-records/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AcceptanceRecord>>, AppError> {
    let record = acceptance_service::find_by_id(&state.db, &current_user, id).await?;
    Ok(ApiResponse::success(record))
}

/// PUT /api/v1/acceptance-records/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireWriter(writer): RequireWriter,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAcceptanceRecord>,
) -> Result<Json<ApiResponse<AcceptanceRecord>>, AppError> {
    let record = acceptance_service::update(&state.db, &writer, id, &body).await?;
    Ok(ApiResponse::success(record))
}

/// PATCH /api/v1/acceptance-records/{id}/decision (manager+)
pub async fn decide(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<Uuid>,
    Json(body): Json<AcceptanceDecision>,
) -> Result<Json<ApiResponse<AcceptanceRecord>>, AppError> {
    let record = acceptance_service::decide(&state.db, &manager, id, &body).await?;
    Ok(ApiResponse::success(record))
}

/// DELETE /api/v1/acceptance-records/{id} (manager+)
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Deleted>>, AppError> {
    acceptance_service::delete(&state.db, &manager, id).await?;
    Ok(ApiResponse::success(Deleted { id }))
}
