//! Evidence routes: multipart upload, metadata, file replacement and download.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::{RequireManager, RequireWriter};
use crate::middleware::upload::UploadForm;
use crate::models::evidence::{
    Evidence, EvidenceFilters, EvidenceSummary, NextEvidenceCode, UpdateEvidence,
};
use crate::models::pagination::{PagedResult, Pagination};
use crate::routes::Deleted;
use crate::services::evidence::{self as evidence_service, EvidenceUpload};
use crate::AppState;

/// GET /api/v1/interviews/{id}/evidence
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(interview_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<EvidenceFilters>,
) -> Result<Json<ApiResponse<PagedResult<EvidenceSummary>>>, AppError> {
    let result =
        evidence_service::list(&state.db, &current_user, interview_id, &filters, &pagination)
            .await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/interviews/{id}/evidence/next-code
pub async fn next_code(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(interview_id): Path<Uuid>,
) -> Result<Json<ApiResponse<NextEvidenceCode>>, AppError> {
    let next = evidence_service::preview_next_code(&state.db, &current_user, interview_id).await?;
    Ok(ApiResponse::success(next))
}

/// POST /api/v1/interviews/{id}/evidence (multipart: file, title, description)
pub async fn create(
    State(state): State<AppState>,
    RequireWriter(writer): RequireWriter,
    Path(interview_id): Path<Uuid>,
    mut form: UploadForm,
) -> Result<Json<ApiResponse<Evidence>>, AppError> {
    let upload = EvidenceUpload {
        file: form.require_file()?,
        title: form.text("title"),
        description: form.text("description"),
    };

    let evidence = evidence_service::create(
        &state.db,
        &state.storage,
        &writer,
        interview_id,
        upload,
    )
    .await?;

    Ok(ApiResponse::success(evidence))
}

/// GET /api/v1/evidence/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Evidence>>, AppError> {
    let evidence = evidence_service::find_by_id(&state.db, &current_user, id).await?;
    Ok(ApiResponse::success(evidence))
}

/// PUT /api/v1/evidence/{id}: title and description only.
pub async fn update(
    State(state): State<AppState>,
    RequireWriter(writer): RequireWriter,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateEvidence>,
) -> Result<Json<ApiResponse<Evidence>>, AppError> {
    let evidence = evidence_service::update(&state.db, &writer, id, &body).await?;
    Ok(ApiResponse::success(evidence))
}

/// PUT /api/v1/evidence/{id}/file (multipart: file)
pub async fn replace_file(
    State(state): State<AppState>,
    RequireWriter(writer): RequireWriter,
    Path(id): Path<Uuid>,
    mut form: UploadForm,
) -> Result<Json<ApiResponse<Evidence>>, AppError> {
    let file = form.require_file()?;
    let evidence =
        evidence_service::replace_file(&state.db, &state.storage, &writer, id, file).await?;
    Ok(ApiResponse::success(evidence))
}

/// GET /api/v1/evidence/{id}/download
pub async fn download(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let file = evidence_service::download(&state.db, &state.storage, &current_user, id).await?;

    let content_type = HeaderValue::from_str(&file.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition =
        HeaderValue::from_str(&evidence_service::content_disposition(&file.evidence.original_filename))
            .map_err(|e| AppError::Internal(format!("Invalid Content-Disposition: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
        ],
        file.bytes,
    )
        .into_response())
}

/// DELETE /api/v1/evidence/{id} (manager+)
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Deleted>>, AppError> {
    evidence_service::delete(&state.db, &state.storage, &manager, id).await?;
    Ok(ApiResponse::success(Deleted { id }))
}
