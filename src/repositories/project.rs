//! Project data access.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::pagination::Pagination;
use crate::models::project::{CreateProject, Project, ProjectStatus, ProjectSummary, UpdateProject};

pub async fn insert(
    pool: &PgPool,
    organization_id: Uuid,
    input: &CreateProject,
    created_by: Uuid,
) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects (organization_id, name, code, description, status,
            start_date, end_date, created_by)
        VALUES ($1, $2, $3, $4, COALESCE($5, 'Active'), $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(organization_id)
    .bind(input.name.trim())
    .bind(input.code.trim())
    .bind(&input.description)
    .bind(input.status)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(created_by)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list(
    pool: &PgPool,
    organization_id: Uuid,
    status: Option<ProjectStatus>,
    search: Option<&str>,
    pagination: &Pagination,
) -> Result<(Vec<ProjectSummary>, i64), sqlx::Error> {
    let mut conditions = vec!["p.organization_id = $1".to_string()];
    let mut param_index = 1u32;

    if status.is_some() {
        param_index += 1;
        conditions.push(format!("p.status = ${param_index}"));
    }
    if search.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(p.name ILIKE ${param_index} OR p.code ILIKE ${param_index} OR p.description ILIKE ${param_index})"
        ));
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));
    let count_sql = format!("SELECT COUNT(*) FROM projects p {where_clause}");
    let data_sql = format!(
        "SELECT p.id, p.organization_id, p.name, p.code, p.status, p.start_date, p.end_date, \
         (SELECT COUNT(*) FROM interviews i WHERE i.project_id = p.id) AS interview_count \
         FROM projects p {where_clause} ORDER BY p.created_at DESC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(organization_id);
    let mut data_query = sqlx::query_as::<_, ProjectSummary>(&data_sql).bind(organization_id);

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

pub async fn update(pool: &PgPool, id: Uuid, input: &UpdateProject) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        r#"
        UPDATE projects SET
            name = COALESCE($2, name),
            code = COALESCE($3, code),
            description = COALESCE($4, description),
            status = COALESCE($5, status),
            start_date = COALESCE($6, start_date),
            end_date = COALESCE($7, end_date),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.name.as_deref().map(str::trim))
    .bind(input.code.as_deref().map(str::trim))
    .bind(&input.description)
    .bind(input.status)
    .bind(input.start_date)
    .bind(input.end_date)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
