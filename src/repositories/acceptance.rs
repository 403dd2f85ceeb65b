//! Acceptance record data access.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::acceptance::{
    AcceptanceRecord, AcceptanceRecordSummary, AcceptanceStatus, CreateAcceptanceRecord,
    UpdateAcceptanceRecord,
};
use crate::models::pagination::Pagination;

pub async fn insert(
    pool: &PgPool,
    project_id: Uuid,
    input: &CreateAcceptanceRecord,
    created_by: Uuid,
) -> Result<AcceptanceRecord, sqlx::Error> {
    sqlx::query_as::<_, AcceptanceRecord>(
        r#"
        INSERT INTO acceptance_records (project_id, title, description, criteria,
            stakeholder_name, due_date, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(project_id)
    .bind(input.title.trim())
    .bind(&input.description)
    .bind(&input.criteria)
    .bind(&input.stakeholder_name)
    .bind(input.due_date)
    .bind(created_by)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<AcceptanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AcceptanceRecord>("SELECT * FROM acceptance_records WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list(
    pool: &PgPool,
    project_id: Uuid,
    status: Option<AcceptanceStatus>,
    search: Option<&str>,
    pagination: &Pagination,
) -> Result<(Vec<AcceptanceRecordSummary>, i64), sqlx::Error> {
    let mut conditions = vec!["project_id = $1".to_string()];
    let mut param_index = 1u32;

    if status.is_some() {
        param_index += 1;
        conditions.push(format!("status = ${param_index}"));
    }
    if search.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(title ILIKE ${param_index} OR stakeholder_name ILIKE ${param_index})"
        ));
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));
    let count_sql = format!("SELECT COUNT(*) FROM acceptance_records {where_clause}");
    let data_sql = format!(
        "SELECT id, project_id, title, status, stakeholder_name, due_date, decided_at \
         FROM acceptance_records {where_clause} \
         ORDER BY due_date ASC NULLS LAST, created_at DESC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(project_id);
    let mut data_query = sqlx::query_as::<_, AcceptanceRecordSummary>(&data_sql).bind(project_id);

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

/// Edit a record that is still `Pending`. Returns `None` once it has been decided.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    input: &UpdateAcceptanceRecord,
) -> Result<Option<AcceptanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AcceptanceRecord>(
        r#"
        UPDATE acceptance_records SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            criteria = COALESCE($4, criteria),
            stakeholder_name = COALESCE($5, stakeholder_name),
            due_date = COALESCE($6, due_date),
            updated_at = NOW()
        WHERE id = $1 AND status = 'Pending'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.title.as_deref().map(str::trim))
    .bind(&input.description)
    .bind(&input.criteria)
    .bind(&input.stakeholder_name)
    .bind(input.due_date)
    .fetch_optional(pool)
    .await
}

/// Record a status change. `decided_by = None` clears the decision stamp.
///
/// The update only applies while the row still has `expected` status, so a
/// concurrent decision yields `None` instead of silently overwriting.
pub async fn set_status(
    pool: &PgPool,
    id: Uuid,
    expected: AcceptanceStatus,
    status: AcceptanceStatus,
    decided_by: Option<Uuid>,
    notes: Option<&str>,
) -> Result<Option<AcceptanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AcceptanceRecord>(
        r#"
        UPDATE acceptance_records SET
            status = $3,
            decided_by = $4,
            decided_at = CASE WHEN $4::uuid IS NULL THEN NULL ELSE NOW() END,
            decision_notes = $5,
            updated_at = NOW()
        WHERE id = $1 AND status = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(expected)
    .bind(status)
    .bind(decided_by)
    .bind(notes)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM acceptance_records WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
