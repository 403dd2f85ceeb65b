//! Artifact data access.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::artifact::{Artifact, ArtifactType, CreateArtifact, UpdateArtifact};
use crate::models::pagination::Pagination;

pub async fn insert(
    pool: &PgPool,
    project_id: Uuid,
    input: &CreateArtifact,
) -> Result<Artifact, sqlx::Error> {
    sqlx::query_as::<_, Artifact>(
        r#"
        INSERT INTO artifacts (project_id, name, artifact_type, version, reference, owner, description)
        VALUES ($1, $2, COALESCE($3, 'Other'), COALESCE($4, ''), $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(project_id)
    .bind(input.name.trim())
    .bind(input.artifact_type)
    .bind(input.version.as_deref().map(str::trim))
    .bind(&input.reference)
    .bind(&input.owner)
    .bind(&input.description)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Artifact>, sqlx::Error> {
    sqlx::query_as::<_, Artifact>("SELECT * FROM artifacts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_name_version(
    pool: &PgPool,
    project_id: Uuid,
    name: &str,
    version: &str,
) -> Result<Option<Artifact>, sqlx::Error> {
    sqlx::query_as::<_, Artifact>(
        "SELECT * FROM artifacts WHERE project_id = $1 AND name = $2 AND version = $3",
    )
    .bind(project_id)
    .bind(name)
    .bind(version)
    .fetch_optional(pool)
    .await
}

pub async fn list(
    pool: &PgPool,
    project_id: Uuid,
    artifact_type: Option<ArtifactType>,
    search: Option<&str>,
    pagination: &Pagination,
) -> Result<(Vec<Artifact>, i64), sqlx::Error> {
    let mut conditions = vec!["project_id = $1".to_string()];
    let mut param_index = 1u32;

    if artifact_type.is_some() {
        param_index += 1;
        conditions.push(format!("artifact_type = ${param_index}"));
    }
    if search.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(name ILIKE ${param_index} OR reference ILIKE ${param_index} OR owner ILIKE ${param_index})"
        ));
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));
    let count_sql = format!("SELECT COUNT(*) FROM artifacts {where_clause}");
    let data_sql = format!(
        "SELECT * FROM artifacts {where_clause} ORDER BY name ASC, version DESC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(project_id);
    let mut data_query = sqlx::query_as::<_, Artifact>(&data_sql).bind(project_id);

    if let Some(kind) = artifact_type {
        count_query = count_query.bind(kind);
        data_query = data_query.bind(kind);
    }
    if let Some(pattern) = search {
        count_query = count_query.bind(pattern.to_string());
        data_query = data_query.bind(pattern.to_string());
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;
    Ok((items, total))
}

pub async fn update(pool: &PgPool, id: Uuid, input: &UpdateArtifact) -> Result<Artifact, sqlx::Error> {
    sqlx::query_as::<_, Artifact>(
        r#"
        UPDATE artifacts SET
            name = COALESCE($2, name),
            artifact_type = COALESCE($3, artifact_type),
            version = COALESCE($4, version),
            reference = COALESCE($5, reference),
            owner = COALESCE($6, owner),
            description = COALESCE($7, description),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.name.as_deref().map(str::trim))
    .bind(input.artifact_type)
    .bind(input.version.as_deref().map(str::trim))
    .bind(&input.reference)
    .bind(&input.owner)
    .bind(&input.description)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM artifacts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
