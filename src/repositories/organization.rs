//! Organization data access.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::organization::{CreateOrganization, Organization, UpdateOrganization};
use crate::models::pagination::Pagination;

pub async fn insert(pool: &PgPool, input: &CreateOrganization) -> Result<Organization, sqlx::Error> {
    sqlx::query_as::<_, Organization>(
        r#"
        INSERT INTO organizations (name, slug, description)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(input.name.trim())
    .bind(&input.slug)
    .bind(&input.description)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Organization>, sqlx::Error> {
    sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Organization>, sqlx::Error> {
    sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

/// Page through organizations. `only` restricts the result to a single tenant.
pub async fn list(
    pool: &PgPool,
    only: Option<Uuid>,
    search: Option<&str>,
    pagination: &Pagination,
) -> Result<(Vec<Organization>, i64), sqlx::Error> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    if only.is_some() {
        param_index += 1;
        conditions.push(format!("id = ${param_index}"));
    }
    if search.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(name ILIKE ${param_index} OR slug ILIKE ${param_index})"
        ));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM organizations {where_clause}");
    let data_sql = format!(
        "SELECT * FROM organizations {where_clause} ORDER BY name ASC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, Organization>(&data_sql);

    if let Some(id) = only {
        count_query = count_query.bind(id);
        data_query = data_query.bind(id);
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
    input: &UpdateOrganization,
) -> Result<Organization, sqlx::Error> {
    sqlx::query_as::<_, Organization>(
        r#"
        UPDATE organizations SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.name.as_deref().map(str::trim))
    .bind(&input.description)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
