//! Artifact model: reference data (documents, diagrams, datasets) held by a project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "artifact_type")]
pub enum ArtifactType {
    Document,
    Diagram,
    Dataset,
    #[sqlx(rename = "Source_Code")]
    SourceCode,
    Recording,
    Other,
}

impl ArtifactType {
    /// Lenient parse used by CSV import: accepts `Source_Code`, `source code`, `SourceCode`.
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "document" | "doc" => Some(Self::Document),
            "diagram" => Some(Self::Diagram),
            "dataset" | "data" => Some(Self::Dataset),
            "sourcecode" | "code" => Some(Self::SourceCode),
            "recording" => Some(Self::Recording),
            "other" | "" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Artifact {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub artifact_type: ArtifactType,
    pub version: String,
    pub reference: Option<String>,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateArtifact {
    #[validate(length(min = 1, max = 300, message = "must be 1 to 300 characters"))]
    pub name: String,
    pub artifact_type: Option<ArtifactType>,
    #[validate(length(max = 64, message = "must be at most 64 characters"))]
    pub version: Option<String>,
    pub reference: Option<String>,
    pub owner: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateArtifact {
    #[validate(length(min = 1, max = 300, message = "must be 1 to 300 characters"))]
    pub name: Option<String>,
    pub artifact_type: Option<ArtifactType>,
    #[validate(length(max = 64, message = "must be at most 64 characters"))]
    pub version: Option<String>,
    pub reference: Option<String>,
    pub owner: Option<String>,
    pub description: Option<String>,
}

/// Filters for listing artifacts.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ArtifactFilters {
    pub artifact_type: Option<ArtifactType>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_type_parsing() {
        assert_eq!(ArtifactType::parse_loose("Source_Code"), Some(ArtifactType::SourceCode));
        assert_eq!(ArtifactType::parse_loose("source code"), Some(ArtifactType::SourceCode));
        assert_eq!(ArtifactType::parse_loose(" DIAGRAM "), Some(ArtifactType::Diagram));
        assert_eq!(ArtifactType::parse_loose(""), Some(ArtifactType::Other));
        assert_eq!(ArtifactType::parse_loose("spreadsheet"), None);
    }

    #[test]
    fn artifact_type_serialization() {
        let json = serde_json::to_string(&ArtifactType::SourceCode).unwrap();
        assert_eq!(json, "\"SourceCode\"");
    }
}
