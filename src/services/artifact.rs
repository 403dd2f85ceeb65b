//! Artifact service: project reference data CRUD and CSV import.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::artifact::{
    Artifact, ArtifactFilters, ArtifactType, CreateArtifact, UpdateArtifact,
};
use crate::models::pagination::{search_pattern, PagedResult, Pagination};
use crate::repositories::artifact as artifact_repo;
use crate::services::access::Access;
use crate::services::project as project_service;

/// Result of a CSV import.
#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<ImportError>,
}

/// Individual import error; `row` is the 1-based data row (header excluded).
#[derive(Debug, Serialize)]
pub struct ImportError {
    pub row: usize,
    pub name: Option<String>,
    pub message: String,
}

/// One CSV row as written by users. Unknown columns are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    name: Option<String>,
    artifact_type: Option<String>,
    version: Option<String>,
    reference: Option<String>,
    owner: Option<String>,
    description: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse artifact rows from CSV bytes. Rows that fail to parse are reported,
/// not fatal; a missing header row is.
pub fn parse_csv(data: &[u8]) -> Result<(Vec<(usize, CreateArtifact)>, Vec<ImportError>), AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Validation(format!("Invalid CSV header: {e}")))?
        .clone();
    if !headers.iter().any(|h| h.eq_ignore_ascii_case("name")) {
        return Err(AppError::Validation(
            "CSV must have a 'name' column".to_string(),
        ));
    }
    let normalized: csv::StringRecord = headers
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();
    reader.set_headers(normalized);

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (i, record) in reader.deserialize::<CsvRow>().enumerate() {
        let row = i + 1;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                errors.push(ImportError {
                    row,
                    name: None,
                    message: format!("Unreadable row: {e}"),
                });
                continue;
            }
        };

        let Some(name) = non_empty(record.name) else {
            errors.push(ImportError {
                row,
                name: None,
                message: "name is required".to_string(),
            });
            continue;
        };

        let artifact_type = match non_empty(record.artifact_type) {
            None => None,
            Some(raw) => match ArtifactType::parse_loose(&raw) {
                Some(t) => Some(t),
                None => {
                    errors.push(ImportError {
                        row,
                        name: Some(name),
                        message: format!("Unknown artifact_type '{raw}'"),
                    });
                    continue;
                }
            },
        };

        let input = CreateArtifact {
            name,
            artifact_type,
            version: non_empty(record.version),
            reference: non_empty(record.reference),
            owner: non_empty(record.owner),
            description: non_empty(record.description),
        };
        if let Err(e) = input.validate() {
            errors.push(ImportError {
                row,
                name: Some(input.name.clone()),
                message: AppError::from(e).to_string(),
            });
            continue;
        }
        rows.push((row, input));
    }

    Ok((rows, errors))
}

/// Load an artifact and check the actor's access through its project.
async fn authorize(
    pool: &PgPool,
    actor: &CurrentUser,
    id: Uuid,
    level: Access,
) -> Result<Artifact, AppError> {
    let artifact = artifact_repo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Artifact not found".to_string()))?;
    project_service::authorize(pool, actor, artifact.project_id, level).await?;
    Ok(artifact)
}

fn duplicate_message(name: &str, version: Option<&str>) -> String {
    match version.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => format!("Artifact '{name}' version '{v}' already exists"),
        None => format!("Artifact '{name}' already exists"),
    }
}

pub async fn create(
    pool: &PgPool,
    actor: &CurrentUser,
    project_id: Uuid,
    input: &CreateArtifact,
) -> Result<Artifact, AppError> {
    input.validate()?;
    let project = project_service::authorize(pool, actor, project_id, Access::Write).await?;
    artifact_repo::insert(pool, project.id, input)
        .await
        .map_err(|e| AppError::from_write(e, duplicate_message(&input.name, input.version.as_deref())))
}

pub async fn find_by_id(pool: &PgPool, actor: &CurrentUser, id: Uuid) -> Result<Artifact, AppError> {
    authorize(pool, actor, id, Access::Read).await
}

pub async fn list(
    pool: &PgPool,
    actor: &CurrentUser,
    project_id: Uuid,
    filters: &ArtifactFilters,
    pagination: &Pagination,
) -> Result<PagedResult<Artifact>, AppError> {
    let project = project_service::authorize(pool, actor, project_id, Access::Read).await?;
    let pattern = search_pattern(filters.search.as_deref());
    let (items, total) = artifact_repo::list(
        pool,
        project.id,
        filters.artifact_type,
        pattern.as_deref(),
        pagination,
    )
    .await?;
    Ok(PagedResult::new(items, total, pagination))
}

pub async fn update(
    pool: &PgPool,
    actor: &CurrentUser,
    id: Uuid,
    input: &UpdateArtifact,
) -> Result<Artifact, AppError> {
    input.validate()?;
    let existing = authorize(pool, actor, id, Access::Write).await?;
    let name = input.name.as_deref().unwrap_or(&existing.name);
    let version = input.version.as_deref().or(Some(existing.version.as_str()));
    artifact_repo::update(pool, existing.id, input)
        .await
        .map_err(|e| AppError::from_write(e, duplicate_message(name, version)))
}

pub async fn delete(pool: &PgPool, actor: &CurrentUser, id: Uuid) -> Result<(), AppError> {
    let existing = authorize(pool, actor, id, Access::Manage).await?;
    if !artifact_repo::delete(pool, existing.id).await? {
        return Err(AppError::NotFound("Artifact not found".to_string()));
    }
    Ok(())
}

enum RowOutcome {
    Created,
    Updated,
}

/// Upsert one parsed row by `(name, version)`.
async fn import_row(
    pool: &PgPool,
    project_id: Uuid,
    input: &CreateArtifact,
) -> Result<RowOutcome, sqlx::Error> {
    let version = input.version.clone().unwrap_or_default();
    match artifact_repo::find_by_name_version(pool, project_id, &input.name, &version).await? {
        Some(existing) => {
            let patch = UpdateArtifact {
                name: None,
                artifact_type: input.artifact_type,
                version: None,
                reference: input.reference.clone(),
                owner: input.owner.clone(),
                description: input.description.clone(),
            };
            artifact_repo::update(pool, existing.id, &patch).await?;
            Ok(RowOutcome::Updated)
        }
        None => {
            artifact_repo::insert(pool, project_id, input).await?;
            Ok(RowOutcome::Created)
        }
    }
}

/// Turn a failed row into a reported error. Database detail stays in the log.
fn row_error(row: usize, input: CreateArtifact, e: sqlx::Error) -> ImportError {
    let conflict = duplicate_message(&input.name, input.version.as_deref());
    let message = match AppError::from_write(e, conflict) {
        AppError::Database(e) => {
            tracing::warn!(row, error = %e, "Artifact import row failed");
            "Row could not be saved".to_string()
        }
        err => err.to_string(),
    };
    ImportError {
        row,
        name: Some(input.name),
        message,
    }
}

/// Import artifacts from CSV. Rows matching an existing `(name, version)` are
/// updated in place; the rest are created.
pub async fn import_csv(
    pool: &PgPool,
    actor: &CurrentUser,
    project_id: Uuid,
    data: &[u8],
) -> Result<ImportResult, AppError> {
    let project = project_service::authorize(pool, actor, project_id, Access::Write).await?;
    let (rows, mut errors) = parse_csv(data)?;
    let total = rows.len() + errors.len();

    let mut created = 0usize;
    let mut updated = 0usize;

    for (row, input) in rows {
        match import_row(pool, project.id, &input).await {
            Ok(RowOutcome::Created) => created += 1,
            Ok(RowOutcome::Updated) => updated += 1,
            Err(e) => errors.push(row_error(row, input, e)),
        }
    }

    errors.sort_by_key(|e| e.row);
    tracing::info!(
        project_id = %project.id,
        total,
        created,
        updated,
        failed = errors.len(),
        "Artifact CSV import finished"
    );

    Ok(ImportResult {
        total,
        created,
        updated,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_collects_errors() {
        let csv = "\
Name,Artifact_Type,Version,Reference,Owner,Description
Architecture overview,Diagram,1.2,https://wiki.example.org/arch,Platform team,
,Document,1.0,,,
Interview guide,Spreadsheet,,,,
Raw survey export,dataset,,s3://bucket/survey.csv,,Exported weekly
";
        let (rows, errors) = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(errors.len(), 2);

        let (row, first) = &rows[0];
        assert_eq!(*row, 1);
        assert_eq!(first.name, "Architecture overview");
        assert_eq!(first.artifact_type, Some(ArtifactType::Diagram));
        assert_eq!(first.version.as_deref(), Some("1.2"));
        assert!(first.description.is_none());

        let (row, last) = &rows[1];
        assert_eq!(*row, 4);
        assert_eq!(last.artifact_type, Some(ArtifactType::Dataset));
        assert!(last.version.is_none());

        assert_eq!(errors[0].row, 2);
        assert_eq!(errors[0].message, "name is required");
        assert_eq!(errors[1].row, 3);
        assert!(errors[1].message.contains("Spreadsheet"));
    }

    #[test]
    fn name_column_is_required() {
        let err = parse_csv(b"title,version\nFoo,1\n").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn minimal_csv_with_only_names() {
        let (rows, errors) = parse_csv(b"name\nConsent template\nCodebook\n").unwrap();
        assert!(errors.is_empty());
        assert_eq!(rows.len(), 2);
        assert!(rows[1].1.artifact_type.is_none());
    }

    #[test]
    fn failed_lookup_becomes_row_error() {
        let input = CreateArtifact {
            name: "Interview guide".to_string(),
            artifact_type: None,
            version: Some("3".to_string()),
            reference: None,
            owner: None,
            description: None,
        };
        let err = row_error(7, input, sqlx::Error::PoolTimedOut);
        assert_eq!(err.row, 7);
        assert_eq!(err.name.as_deref(), Some("Interview guide"));
        assert_eq!(err.message, "Row could not be saved");
    }

    #[test]
    fn duplicate_messages() {
        assert_eq!(
            duplicate_message("Codebook", Some("2")),
            "Artifact 'Codebook' version '2' already exists"
        );
        assert_eq!(duplicate_message("Codebook", Some("")), "Artifact 'Codebook' already exists");
    }
}
