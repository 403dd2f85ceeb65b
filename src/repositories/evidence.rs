//! Evidence data access.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::evidence::{
    Evidence, EvidenceSummary, NewEvidence, ReplacementFile, UpdateEvidence,
};
use crate::models::pagination::Pagination;

pub async fn insert(pool: &PgPool, code: &str, input: &NewEvidence) -> Result<Evidence, sqlx::Error> {
    sqlx::query_as::<_, Evidence>(
        r#"
        INSERT INTO evidence (interview_id, code, title, description, original_filename,
            stored_path, content_type, size_bytes, sha256, uploaded_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(input.interview_id)
    .bind(code)
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.original_filename)
    .bind(&input.stored_path)
    .bind(&input.content_type)
    .bind(input.size_bytes)
    .bind(&input.sha256)
    .bind(input.uploaded_by)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Evidence>, sqlx::Error> {
    sqlx::query_as::<_, Evidence>("SELECT * FROM evidence WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// All codes currently assigned within an interview.
pub async fn list_codes(pool: &PgPool, interview_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT code FROM evidence WHERE interview_id = $1")
        .bind(interview_id)
        .fetch_all(pool)
        .await
}

pub async fn list(
    pool: &PgPool,
    interview_id: Uuid,
    search: Option<&str>,
    pagination: &Pagination,
) -> Result<(Vec<EvidenceSummary>, i64), sqlx::Error> {
    let where_clause = if search.is_some() {
        "WHERE interview_id = $1 AND (code ILIKE $2 OR title ILIKE $2 OR original_filename ILIKE $2)"
    } else {
        "WHERE interview_id = $1"
    };

    let count_sql = format!("SELECT COUNT(*) FROM evidence {where_clause}");
    let data_sql = format!(
        "SELECT id, interview_id, code, title, original_filename, content_type, size_bytes, created_at \
         FROM evidence {where_clause} ORDER BY created_at ASC, code ASC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(interview_id);
    let mut data_query = sqlx::query_as::<_, EvidenceSummary>(&data_sql).bind(interview_id);
    if let Some(pattern) = search {
        count_query = count_query.bind(pattern.to_string());
        data_query = data_query.bind(pattern.to_string());
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;
    Ok((items, total))
}

pub async fn update(pool: &PgPool, id: Uuid, input: &UpdateEvidence) -> Result<Evidence, sqlx::Error> {
    sqlx::query_as::<_, Evidence>(
        r#"
        UPDATE evidence SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.title.as_deref().map(str::trim))
    .bind(&input.description)
    .fetch_one(pool)
    .await
}

pub async fn replace_file(
    pool: &PgPool,
    id: Uuid,
    file: &ReplacementFile,
) -> Result<Evidence, sqlx::Error> {
    sqlx::query_as::<_, Evidence>(
        r#"
        UPDATE evidence SET
            original_filename = $2,
            stored_path = $3,
            content_type = $4,
            size_bytes = $5,
            sha256 = $6,
            uploaded_by = $7,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&file.original_filename)
    .bind(&file.stored_path)
    .bind(&file.content_type)
    .bind(file.size_bytes)
    .bind(&file.sha256)
    .bind(file.uploaded_by)
    .fetch_one(pool)
    .await
}

/// Delete a row and hand back its stored path so the caller can remove the file.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("DELETE FROM evidence WHERE id = $1 RETURNING stored_path")
        .bind(id)
        .fetch_optional(pool)
        .await
}
