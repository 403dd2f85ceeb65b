//! Evidence service: file-backed records under an interview.
//!
//! Creating evidence stores the file first, then inserts the row with the
//! next sequential code for the interview. Two concurrent uploads can compute
//! the same code; the unique `(interview_id, code)` constraint rejects the
//! loser, which recomputes and retries a bounded number of times.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::middleware::upload::UploadedFile;
use crate::models::evidence::{
    Evidence, EvidenceFilters, EvidenceSummary, NewEvidence, NextEvidenceCode, ReplacementFile,
    UpdateEvidence,
};
use crate::models::pagination::{search_pattern, PagedResult, Pagination};
use crate::repositories::evidence as evidence_repo;
use crate::services::access::Access;
use crate::services::evidence_code;
use crate::services::interview as interview_service;
use crate::services::storage::{sanitize_filename, FileStorage, StorageScope};

/// Attempts at allocating a code before giving up with `Conflict`.
const MAX_CODE_ATTEMPTS: usize = 5;

/// Name of the unique constraint guarding per-interview codes.
const CODE_CONSTRAINT: &str = "evidence_interview_code_key";

const MAX_TITLE_LEN: usize = 300;

/// A validated upload request for a new evidence record.
#[derive(Debug, Clone)]
pub struct EvidenceUpload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub file: UploadedFile,
}

/// Evidence metadata together with the stored bytes.
#[derive(Debug)]
pub struct EvidenceDownload {
    pub evidence: Evidence,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Prefer the declared type unless it is missing or generic; otherwise guess from the name.
pub fn resolve_content_type(declared: Option<&str>, filename: &str) -> Option<String> {
    match declared.map(str::trim) {
        Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => Some(ct.to_string()),
        _ => mime_guess::from_path(filename).first().map(|m| m.to_string()),
    }
}

/// `Content-Disposition` value with an ASCII fallback and an RFC 5987 UTF-8 name.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() || c == ' ' {
                if c == '"' || c == '\\' {
                    '_'
                } else {
                    c
                }
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}

fn is_code_collision(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.constraint() == Some(CODE_CONSTRAINT)
        }
        _ => false,
    }
}

async fn next_code(pool: &PgPool, interview_id: Uuid) -> Result<String, AppError> {
    let codes = evidence_repo::list_codes(pool, interview_id).await?;
    Ok(evidence_code::next_code(codes.iter().map(String::as_str)))
}

/// Insert under the next free code, recomputing on a code collision.
async fn insert_with_next_code(pool: &PgPool, new: &NewEvidence) -> Result<Evidence, AppError> {
    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let code = next_code(pool, new.interview_id).await?;
        match evidence_repo::insert(pool, &code, new).await {
            Ok(evidence) => return Ok(evidence),
            Err(e) if is_code_collision(&e) => {
                tracing::debug!(
                    interview_id = %new.interview_id,
                    code = %code,
                    attempt,
                    "Evidence code taken, retrying"
                );
            }
            Err(e) => return Err(AppError::from_write(e, "Evidence could not be saved")),
        }
    }
    tracing::warn!(interview_id = %new.interview_id, "Evidence code allocation exhausted retries");
    Err(AppError::Conflict(format!(
        "Could not allocate an evidence code after {MAX_CODE_ATTEMPTS} attempts"
    )))
}

fn check_title(title: &str) -> Result<(), AppError> {
    if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "title must be 1 to {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Preview the code the next upload would receive. Nothing is reserved.
pub async fn preview_next_code(
    pool: &PgPool,
    actor: &CurrentUser,
    interview_id: Uuid,
) -> Result<NextEvidenceCode, AppError> {
    interview_service::authorize_scope(pool, actor, interview_id, Access::Read).await?;
    Ok(NextEvidenceCode {
        interview_id,
        code: next_code(pool, interview_id).await?,
    })
}

pub async fn create(
    pool: &PgPool,
    storage: &FileStorage,
    actor: &CurrentUser,
    interview_id: Uuid,
    upload: EvidenceUpload,
) -> Result<Evidence, AppError> {
    let scope =
        interview_service::authorize_scope(pool, actor, interview_id, Access::Write).await?;

    let original_filename = sanitize_filename(&upload.file.filename);
    let title = upload
        .title
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| original_filename.clone());
    check_title(&title)?;

    let stored = storage
        .store(
            StorageScope {
                organization_id: scope.organization_id,
                project_id: scope.project_id,
                interview_id,
            },
            &original_filename,
            &upload.file.bytes,
        )
        .await?;

    let new = NewEvidence {
        interview_id,
        title,
        description: upload.description,
        content_type: resolve_content_type(
            upload.file.content_type.as_deref(),
            &original_filename,
        ),
        original_filename,
        stored_path: stored.relative_path.clone(),
        size_bytes: stored.size_bytes,
        sha256: stored.sha256,
        uploaded_by: actor.id,
    };

    match insert_with_next_code(pool, &new).await {
        Ok(evidence) => {
            tracing::info!(
                evidence_id = %evidence.id,
                interview_id = %interview_id,
                code = %evidence.code,
                size = evidence.size_bytes,
                "Evidence uploaded"
            );
            Ok(evidence)
        }
        Err(e) => {
            storage.remove_quietly(&stored.relative_path).await;
            Err(e)
        }
    }
}

/// Load evidence and check the actor's access through its interview.
async fn authorize(
    pool: &PgPool,
    actor: &CurrentUser,
    id: Uuid,
    level: Access,
) -> Result<(Evidence, StorageScope), AppError> {
    let evidence = evidence_repo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Evidence not found".to_string()))?;
    let scope =
        interview_service::authorize_scope(pool, actor, evidence.interview_id, level).await?;
    let storage_scope = StorageScope {
        organization_id: scope.organization_id,
        project_id: scope.project_id,
        interview_id: evidence.interview_id,
    };
    Ok((evidence, storage_scope))
}

pub async fn find_by_id(pool: &PgPool, actor: &CurrentUser, id: Uuid) -> Result<Evidence, AppError> {
    let (evidence, _) = authorize(pool, actor, id, Access::Read).await?;
    Ok(evidence)
}

pub async fn list(
    pool: &PgPool,
    actor: &CurrentUser,
    interview_id: Uuid,
    filters: &EvidenceFilters,
    pagination: &Pagination,
) -> Result<PagedResult<EvidenceSummary>, AppError> {
    interview_service::authorize_scope(pool, actor, interview_id, Access::Read).await?;
    let pattern = search_pattern(filters.search.as_deref());
    let (items, total) =
        evidence_repo::list(pool, interview_id, pattern.as_deref(), pagination).await?;
    Ok(PagedResult::new(items, total, pagination))
}

pub async fn update(
    pool: &PgPool,
    actor: &CurrentUser,
    id: Uuid,
    input: &UpdateEvidence,
) -> Result<Evidence, AppError> {
    input.validate()?;
    let (existing, _) = authorize(pool, actor, id, Access::Write).await?;
    Ok(evidence_repo::update(pool, existing.id, input).await?)
}

/// Swap the stored file of an existing record, keeping its code.
pub async fn replace_file(
    pool: &PgPool,
    storage: &FileStorage,
    actor: &CurrentUser,
    id: Uuid,
    file: UploadedFile,
) -> Result<Evidence, AppError> {
    let (existing, scope) = authorize(pool, actor, id, Access::Write).await?;

    let original_filename = sanitize_filename(&file.filename);
    let stored = storage.store(scope, &original_filename, &file.bytes).await?;

    let replacement = ReplacementFile {
        content_type: resolve_content_type(file.content_type.as_deref(), &original_filename),
        original_filename,
        stored_path: stored.relative_path.clone(),
        size_bytes: stored.size_bytes,
        sha256: stored.sha256,
        uploaded_by: actor.id,
    };

    let updated = match evidence_repo::replace_file(pool, existing.id, &replacement).await {
        Ok(updated) => updated,
        Err(e) => {
            storage.remove_quietly(&stored.relative_path).await;
            return Err(e.into());
        }
    };

    storage.remove_quietly(&existing.stored_path).await;
    tracing::info!(evidence_id = %updated.id, code = %updated.code, "Evidence file replaced");
    Ok(updated)
}

pub async fn download(
    pool: &PgPool,
    storage: &FileStorage,
    actor: &CurrentUser,
    id: Uuid,
) -> Result<EvidenceDownload, AppError> {
    let (evidence, _) = authorize(pool, actor, id, Access::Read).await?;
    let bytes = storage.read(&evidence.stored_path).await?;
    let content_type = evidence
        .content_type
        .clone()
        .or_else(|| resolve_content_type(None, &evidence.original_filename))
        .unwrap_or_else(|| "application/octet-stream".to_string());
    Ok(EvidenceDownload {
        evidence,
        content_type,
        bytes,
    })
}

pub async fn delete(
    pool: &PgPool,
    storage: &FileStorage,
    actor: &CurrentUser,
    id: Uuid,
) -> Result<(), AppError> {
    let (existing, _) = authorize(pool, actor, id, Access::Manage).await?;
    let stored_path = evidence_repo::delete(pool, existing.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Evidence not found".to_string()))?;
    storage.remove_quietly(&stored_path).await;
    tracing::info!(evidence_id = %existing.id, code = %existing.code, "Evidence deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_content_type_wins_unless_generic() {
        assert_eq!(
            resolve_content_type(Some("image/png"), "scan.pdf").as_deref(),
            Some("image/png")
        );
        assert_eq!(
            resolve_content_type(Some("application/octet-stream"), "scan.pdf").as_deref(),
            Some("application/pdf")
        );
        assert_eq!(
            resolve_content_type(None, "transcript.txt").as_deref(),
            Some("text/plain")
        );
        assert_eq!(resolve_content_type(Some(" "), "no-extension"), None);
    }

    #[test]
    fn disposition_escapes_non_ascii_names() {
        let header = content_disposition("entrevista señor.pdf");
        assert!(header.starts_with("attachment; filename=\"entrevista se_or.pdf\""));
        assert!(header.contains("filename*=UTF-8''entrevista%20se%C3%B1or.pdf"));
    }

    #[test]
    fn disposition_replaces_quotes() {
        let header = content_disposition("a\"b.txt");
        assert!(header.contains("filename=\"a_b.txt\""));
    }

    #[test]
    fn title_bounds() {
        assert!(check_title("Consent form").is_ok());
        assert!(check_title("").is_err());
        assert!(check_title(&"x".repeat(MAX_TITLE_LEN + 1)).is_err());
    }

    #[test]
    fn non_database_errors_are_not_collisions() {
        assert!(!is_code_collision(&sqlx::Error::RowNotFound));
    }
}
