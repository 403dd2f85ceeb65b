//! Interview routes: CRUD and search within a project.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::{RequireManager, RequireWriter};
use crate::models::interview::{
    CreateInterview, Interview, InterviewFilters, InterviewSummary, UpdateInterview,
};
use crate::models::pagination::{PagedResult, Pagination};
use crate::routes::Deleted;
use crate::services::interview as interview_service;
use crate::AppState;

/// GET /api/v1/projects/{id}/interviews
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(project_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<InterviewFilters>,
) -> Result<Json<ApiResponse<PagedResult<InterviewSummary>>>, AppError> {
    let result =
        interview_service::list(&state.db, &current_user, project_id, &filters, &pagination)
            .await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/projects/{id}/interviews (writer+)
pub async fn create(
    State(state): State<AppState>,
    RequireWriter(writer): RequireWriter,
    Path(project_id): Path<Uuid>,
    Json(body): Json<CreateInterview>,
) -> Result<Json<ApiResponse<Interview>>, AppError> {
    let interview = interview_service::create(&state.db, &writer, project_id, &body).await?;
    Ok(ApiResponse::success(interview))
}

/// GET /api/v1/interviews/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Interview>>, AppError> {
    let interview = interview_service::find_by_id(&state.db, &current_user, id).await?;
    Ok(ApiResponse::success(interview))
}

/// PUT /api/v1/interviews/{id} (writer+)
pub async fn update(
    State(state): State<AppState>,
    RequireWriter(writer): RequireWriter,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateInterview>,
) -> Result<Json<ApiResponse<Interview>>, AppError> {
    let interview = interview_service::update(&state.db, &writer, id, &body).await?;
    Ok(ApiResponse::success(interview))
}

/// DELETE /api/v1/interviews/{id} (manager+)
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Deleted>>, AppError> {
    interview_service::delete(&state.db, &state.storage, &manager, id).await?;
    Ok(ApiResponse::success(Deleted { id }))
}
