//! Interview data access.

use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::interview::{
    CreateInterview, Interview, InterviewStatus, InterviewSummary, UpdateInterview,
};
use crate::models::pagination::Pagination;

/// Owning tenant and project of an interview.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct InterviewScope {
    pub organization_id: Uuid,
    pub project_id: Uuid,
}

pub async fn insert(
    pool: &PgPool,
    project_id: Uuid,
    input: &CreateInterview,
    created_by: Uuid,
) -> Result<Interview, sqlx::Error> {
    sqlx::query_as::<_, Interview>(
        r#"
        INSERT INTO interviews (project_id, title, interviewee_name, interviewee_role,
            interviewer_name, conducted_at, location, status, notes, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'Scheduled'), $9, $10)
        RETURNING *
        "#,
    )
    .bind(project_id)
    .bind(input.title.trim())
    .bind(input.interviewee_name.trim())
    .bind(&input.interviewee_role)
    .bind(&input.interviewer_name)
    .bind(input.conducted_at)
    .bind(&input.location)
    .bind(input.status)
    .bind(&input.notes)
    .bind(created_by)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Interview>, sqlx::Error> {
    sqlx::query_as::<_, Interview>("SELECT * FROM interviews WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Resolve the organization and project an interview belongs to.
pub async fn find_scope(pool: &PgPool, id: Uuid) -> Result<Option<InterviewScope>, sqlx::Error> {
    sqlx::query_as::<_, InterviewScope>(
        r#"
        SELECT p.organization_id, p.id AS project_id
        FROM interviews i
        JOIN projects p ON p.id = i.project_id
        WHERE i.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn list(
    pool: &PgPool,
    project_id: Uuid,
    status: Option<InterviewStatus>,
    search: Option<&str>,
    pagination: &Pagination,
) -> Result<(Vec<InterviewSummary>, i64), sqlx::Error> {
    let mut conditions = vec!["i.project_id = $1".to_string()];
    let mut param_index = 1u32;

    if status.is_some() {
        param_index += 1;
        conditions.push(format!("i.status = ${param_index}"));
    }
    if search.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(i.title ILIKE ${param_index} OR i.interviewee_name ILIKE ${param_index} \
             OR i.interviewer_name ILIKE ${param_index})"
        ));
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));
    let count_sql = format!("SELECT COUNT(*) FROM interviews i {where_clause}");
    let data_sql = format!(
        "SELECT i.id, i.project_id, i.title, i.interviewee_name, i.interviewer_name, \
         i.conducted_at, i.status, \
         (SELECT COUNT(*) FROM evidence e WHERE e.interview_id = i.id) AS evidence_count \
         FROM interviews i {where_clause} \
         ORDER BY i.conducted_at DESC NULLS LAST, i.created_at DESC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(project_id);
    let mut data_query = sqlx::query_as::<_, InterviewSummary>(&data_sql).bind(project_id);

    if let Some(status) = status {
        count_query = count_query.bind(status);
        data_query = data_query.bind(status);
    }
    if let Some(pattern) = search {
        count_query = count_query.bind(pattern.to_string());
        data_query = data_query.bind(pattern.to_string());
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;
    Ok((items, total))
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    input: &UpdateInterview,
) -> Result<Interview, sqlx::Error> {
    sqlx::query_as::<_, Interview>(
        r#"
        UPDATE interviews SET
            title = COALESCE($2, title),
            interviewee_name = COALESCE($3, interviewee_name),
            interviewee_role = COALESCE($4, interviewee_role),
            interviewer_name = COALESCE($5, interviewer_name),
            conducted_at = COALESCE($6, conducted_at),
            location = COALESCE($7, location),
            status = COALESCE($8, status),
            notes = COALESCE($9, notes),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.title.as_deref().map(str::trim))
    .bind(input.interviewee_name.as_deref().map(str::trim))
    .bind(&input.interviewee_role)
    .bind(&input.interviewer_name)
    .bind(input.conducted_at)
    .bind(&input.location)
    .bind(input.status)
    .bind(&input.notes)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM interviews WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
