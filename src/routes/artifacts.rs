//! Artifact reference routes, including CSV bulk import.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::{RequireManager, RequireWriter};
use crate::middleware::upload::UploadForm;
use crate::models::artifact::{Artifact, ArtifactFilters, CreateArtifact, UpdateArtifact};
use crate::models::pagination::{PagedResult, Pagination};
use crate::routes::Deleted;
use crate::services::artifact::{self as artifact_service, ImportResult};
use crate::AppState;

/// GET /api/v1/projects/{id}/artifacts
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(project_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<ArtifactFilters>,
) -> Result<Json<ApiResponse<PagedResult<Artifact>>>, AppError> {
    let result =
        artifact_service::list(&state.db, &current_user, project_id, &filters, &pagination)
            .await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/projects/{id}/artifacts
pub async fn create(
    State(state): State<AppState>,
    RequireWriter(writer): RequireWriter,
    Path(project_id): Path<Uuid>,
    Json(body): Json<CreateArtifact>,
) -> Result<Json<ApiResponse<Artifact>>, AppError> {
    let artifact = artifact_service::create(&state.db, &writer, project_id, &body).await?;
    Ok(ApiResponse::success(artifact))
}

/// POST /api/v1/projects/{id}/artifacts/import (multipart: file)
pub async fn import(
    State(state): State<AppState>,
    RequireWriter(writer): RequireWriter,
    Path(project_id): Path<Uuid>,
    mut form: UploadForm,
) -> Result<Json<ApiResponse<ImportResult>>, AppError> {
    let file = form.require_file()?;
    tracing::info!(
        project_id = %project_id,
        filename = %file.filename,
        size = file.bytes.len(),
        "Artifact CSV import started"
    );

    let result = artifact_service::import_csv(&state.db, &writer, project_id, &file.bytes).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/artifacts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Artifact>>, AppError> {
    let artifact = artifact_service::find_by_id(&state.db, &current_user, id).await?;
    Ok(ApiResponse::success(artifact))
}

/// PUT /api/v1/artifacts/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireWriter(writer): RequireWriter,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateArtifact>,
) -> Result<Json<ApiResponse<Artifact>>, AppError> {
    let artifact = artifact_service::update(&state.db, &writer, id, &body).await?;
    Ok(ApiResponse::success(artifact))
}

/// DELETE /api/v1/artifacts/{id} (manager+)
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Deleted>>, AppError> {
    artifact_service::delete(&state.db, &manager, id).await?;
    Ok(ApiResponse::success(Deleted { id }))
}
