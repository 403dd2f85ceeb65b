//! Acceptance record service: CRUD and decision transitions.
//!
//! A record starts `Pending`. Managers decide it (`Accepted`, `Rejected`,
//! `Withdrawn`); rejected and withdrawn records can be reopened to `Pending`.
//! `Accepted` is final. Content edits are only allowed while `Pending`.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::acceptance::{
    AcceptanceDecision, AcceptanceFilters, AcceptanceRecord, AcceptanceRecordSummary,
    AcceptanceStatus, CreateAcceptanceRecord, UpdateAcceptanceRecord,
};
use crate::models::pagination::{search_pattern, PagedResult, Pagination};
use crate::repositories::acceptance as acceptance_repo;
use crate::services::access::Access;
use crate::services::project as project_service;

/// Check whether a status transition is allowed.
pub fn is_valid_transition(from: AcceptanceStatus, to: AcceptanceStatus) -> bool {
    use AcceptanceStatus::*;
    matches!(
        (from, to),
        (Pending, Accepted)
            | (Pending, Rejected)
            | (Pending, Withdrawn)
            | (Rejected, Pending)
            | (Withdrawn, Pending)
    )
}

/// Validate a decision against the current status, returning trimmed notes.
pub fn validate_decision(
    current: AcceptanceStatus,
    decision: &AcceptanceDecision,
) -> Result<Option<String>, AppError> {
    if !is_valid_transition(current, decision.status) {
        return Err(AppError::InvalidTransition(format!(
            "Cannot move acceptance record from {current:?} to {:?}",
            decision.status
        )));
    }
    let notes = decision
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    if decision.status == AcceptanceStatus::Rejected && notes.is_none() {
        return Err(AppError::Validation(
            "notes are required when rejecting".to_string(),
        ));
    }
    Ok(notes)
}

/// Load a record and check the actor's access through its project.
async fn authorize(
    pool: &PgPool,
    actor: &CurrentUser,
    id: Uuid,
    level: Access,
) -> Result<AcceptanceRecord, AppError> {
    let record = acceptance_repo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Acceptance record not found".to_string()))?;
    project_service::authorize(pool, actor, record.project_id, level).await?;
    Ok(record)
}

pub async fn create(
    pool: &PgPool,
    actor: &CurrentUser,
    project_id: Uuid,
    input: &CreateAcceptanceRecord,
) -> Result<AcceptanceRecord, AppError> {
    input.validate()?;
    let project = project_service::authorize(pool, actor, project_id, Access::Write).await?;
    Ok(acceptance_repo::insert(pool, project.id, input, actor.id).await?)
}

pub async fn find_by_id(
    pool: &PgPool,
    actor: &CurrentUser,
    id: Uuid,
) -> Result<AcceptanceRecord, AppError> {
    authorize(pool, actor, id, Access::Read).await
}

pub async fn list(
    pool: &PgPool,
    actor: &CurrentUser,
    project_id: Uuid,
    filters: &AcceptanceFilters,
    pagination: &Pagination,
) -> Result<PagedResult<AcceptanceRecordSummary>, AppError> {
    let project = project_service::authorize(pool, actor, project_id, Access::Read).await?;
    let pattern = search_pattern(filters.search.as_deref());
    let (items, total) =
        acceptance_repo::list(pool, project.id, filters.status, pattern.as_deref(), pagination)
            .await?;
    Ok(PagedResult::new(items, total, pagination))
}

pub async fn update(
    pool: &PgPool,
    actor: &CurrentUser,
    id: Uuid,
    input: &UpdateAcceptanceRecord,
) -> Result<AcceptanceRecord, AppError> {
    input.validate()?;
    let existing = authorize(pool, actor, id, Access::Write).await?;
    if existing.status != AcceptanceStatus::Pending {
        return Err(AppError::Conflict(format!(
            "Acceptance record is {:?}; reopen it before editing",
            existing.status
        )));
    }
    acceptance_repo::update(pool, existing.id, input)
        .await?
        .ok_or_else(|| {
            AppError::Conflict("Acceptance record was decided concurrently; reload and retry".to_string())
        })
}

/// Apply a decision. Moving back to `Pending` clears the decision stamp.
pub async fn decide(
    pool: &PgPool,
    actor: &CurrentUser,
    id: Uuid,
    decision: &AcceptanceDecision,
) -> Result<AcceptanceRecord, AppError> {
    let existing = authorize(pool, actor, id, Access::Manage).await?;
    let notes = validate_decision(existing.status, decision)?;

    let decided_by = (decision.status != AcceptanceStatus::Pending).then_some(actor.id);
    let updated = acceptance_repo::set_status(
        pool,
        existing.id,
        existing.status,
        decision.status,
        decided_by,
        notes.as_deref(),
    )
    .await?
    .ok_or_else(|| {
        AppError::Conflict("Acceptance record was changed concurrently; reload and retry".to_string())
    })?;

    tracing::info!(
        acceptance_record_id = %updated.id,
        from = ?existing.status,
        to = ?updated.status,
        actor = %actor.username,
        "Acceptance record decided"
    );
    Ok(updated)
}

pub async fn delete(pool: &PgPool, actor: &CurrentUser, id: Uuid) -> Result<(), AppError> {
    let existing = authorize(pool, actor, id, Access::Manage).await?;
    if !acceptance_repo::delete(pool, existing.id).await? {
        return Err(AppError::NotFound("Acceptance record not found".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use AcceptanceStatus::*;

    fn decision(status: AcceptanceStatus, notes: Option<&str>) -> AcceptanceDecision {
        AcceptanceDecision {
            status,
            notes: notes.map(str::to_string),
        }
    }

    #[test]
    fn transition_graph() {
        assert!(is_valid_transition(Pending, Accepted));
        assert!(is_valid_transition(Pending, Rejected));
        assert!(is_valid_transition(Pending, Withdrawn));
        assert!(is_valid_transition(Rejected, Pending));
        assert!(is_valid_transition(Withdrawn, Pending));

        assert!(!is_valid_transition(Accepted, Pending));
        assert!(!is_valid_transition(Accepted, Rejected));
        assert!(!is_valid_transition(Rejected, Accepted));
        assert!(!is_valid_transition(Pending, Pending));
    }

    #[test]
    fn rejection_requires_notes() {
        assert!(matches!(
            validate_decision(Pending, &decision(Rejected, None)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_decision(Pending, &decision(Rejected, Some("   "))),
            Err(AppError::Validation(_))
        ));
        assert_eq!(
            validate_decision(Pending, &decision(Rejected, Some(" unsigned "))).unwrap(),
            Some("unsigned".to_string())
        );
    }

    #[test]
    fn acceptance_without_notes_is_fine() {
        assert_eq!(validate_decision(Pending, &decision(Accepted, None)).unwrap(), None);
    }

    #[test]
    fn invalid_transition_reported() {
        assert!(matches!(
            validate_decision(Accepted, &decision(Pending, None)),
            Err(AppError::InvalidTransition(_))
        ));
    }
}
