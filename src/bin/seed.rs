//! Seed script for development: populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env). Safe to re-run: existing rows are reused.

use anyhow::Context;
use chrono::Utc;
use dossier::models::artifact::{ArtifactType, CreateArtifact};
use dossier::models::interview::{CreateInterview, InterviewStatus};
use dossier::models::organization::{CreateOrganization, Organization};
use dossier::models::project::{CreateProject, Project, ProjectStatus};
use dossier::models::user::{CreateUser, User, UserRole};
use dossier::repositories::{
    artifact as artifact_repo, interview as interview_repo, organization as org_repo,
    project as project_repo, user as user_repo,
};
use dossier::services::auth::hash_password;
use sqlx::PgPool;
use uuid::Uuid;

const ADMIN_PASSWORD: &str = "Test123!";
const DEMO_SLUG: &str = "acme";
const DEMO_PROJECT_CODE: &str = "DEMO";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = dossier::db::create_pool(&db_url, 5).await?;

    // Run migrations first
    dossier::db::run_migrations(&pool).await?;

    println!("=== Dossier Seed Script ===");

    seed_user(
        &pool,
        CreateUser {
            username: "admin".to_string(),
            email: "admin@dossier.local".to_string(),
            password: ADMIN_PASSWORD.to_string(),
            display_name: "Platform Administrator".to_string(),
            role: UserRole::PlatformAdmin,
            organization_id: None,
        },
    )
    .await?;

    let org = seed_organization(&pool).await?;

    let org_admin = seed_user(
        &pool,
        CreateUser {
            username: "acme-admin".to_string(),
            email: "admin@acme.example".to_string(),
            password: ADMIN_PASSWORD.to_string(),
            display_name: "Acme Administrator".to_string(),
            role: UserRole::OrgAdmin,
            organization_id: Some(org.id),
        },
    )
    .await?;

    seed_user(
        &pool,
        CreateUser {
            username: "acme-viewer".to_string(),
            email: "viewer@acme.example".to_string(),
            password: ADMIN_PASSWORD.to_string(),
            display_name: "Acme Viewer".to_string(),
            role: UserRole::Viewer,
            organization_id: Some(org.id),
        },
    )
    .await?;

    let project = seed_project(&pool, &org, org_admin.id).await?;
    seed_interview(&pool, &project, org_admin.id).await?;
    seed_artifacts(&pool, &project).await?;

    println!("\n=== Seed complete! ===");
    println!("Platform admin login: admin / {ADMIN_PASSWORD}");
    println!("Org admin login: acme-admin / {ADMIN_PASSWORD}");

    Ok(())
}

async fn seed_user(pool: &PgPool, input: CreateUser) -> anyhow::Result<User> {
    let hash = hash_password(&input.password)?;

    if let Some(existing) = user_repo::find_by_username(pool, &input.username).await? {
        // Reset the password so the printed credentials always work
        user_repo::set_password_hash(pool, existing.id, &hash).await?;
        println!("[done] Reset password for user '{}'", existing.username);
        return Ok(existing);
    }

    let user = user_repo::insert(pool, &input, &hash).await?;
    println!("[done] Created user '{}' ({:?})", user.username, user.role);
    Ok(user)
}

async fn seed_organization(pool: &PgPool) -> anyhow::Result<Organization> {
    if let Some(org) = org_repo::find_by_slug(pool, DEMO_SLUG).await? {
        println!("[skip] Organization '{DEMO_SLUG}' already exists");
        return Ok(org);
    }

    let org = org_repo::insert(
        pool,
        &CreateOrganization {
            name: "Acme Corporation".to_string(),
            slug: DEMO_SLUG.to_string(),
            description: Some("Demo tenant".to_string()),
        },
    )
    .await?;
    println!("[done] Created organization '{}'", org.name);
    Ok(org)
}

async fn seed_project(pool: &PgPool, org: &Organization, created_by: Uuid) -> anyhow::Result<Project> {
    let existing = sqlx::query_as::<_, Project>(
        "SELECT * FROM projects WHERE organization_id = $1 AND code = $2",
    )
    .bind(org.id)
    .bind(DEMO_PROJECT_CODE)
    .fetch_optional(pool)
    .await?;

    if let Some(project) = existing {
        println!("[skip] Project '{DEMO_PROJECT_CODE}' already exists");
        return Ok(project);
    }

    let project = project_repo::insert(
        pool,
        org.id,
        &CreateProject {
            name: "Payments Platform Review".to_string(),
            code: DEMO_PROJECT_CODE.to_string(),
            description: Some("Stakeholder interviews for the payments platform".to_string()),
            status: Some(ProjectStatus::Active),
            start_date: Some(Utc::now().date_naive()),
            end_date: None,
        },
        created_by,
    )
    .await?;
    println!("[done] Created project '{}'", project.code);
    Ok(project)
}

async fn seed_interview(pool: &PgPool, project: &Project, created_by: Uuid) -> anyhow::Result<()> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM interviews WHERE project_id = $1)",
    )
    .bind(project.id)
    .fetch_one(pool)
    .await?;

    if exists {
        println!("[skip] Project already has interviews");
        return Ok(());
    }

    let interview = interview_repo::insert(
        pool,
        project.id,
        &CreateInterview {
            title: "Kickoff with operations lead".to_string(),
            interviewee_name: "Jordan Reyes".to_string(),
            interviewee_role: Some("Head of Operations".to_string()),
            interviewer_name: Some("Acme Administrator".to_string()),
            conducted_at: Some(Utc::now()),
            location: Some("Remote".to_string()),
            status: Some(InterviewStatus::Completed),
            notes: None,
        },
        created_by,
    )
    .await?;
    println!("[done] Created interview '{}'", interview.title);
    Ok(())
}

async fn seed_artifacts(pool: &PgPool, project: &Project) -> anyhow::Result<()> {
    let artifacts = [
        ("payments-api", ArtifactType::SourceCode, "2.4.1", "https://git.example/payments-api"),
        ("Settlement runbook", ArtifactType::Document, "", "https://wiki.example/settlement"),
    ];

    let mut created = 0;
    for (name, artifact_type, version, reference) in artifacts {
        if artifact_repo::find_by_name_version(pool, project.id, name, version)
            .await?
            .is_some()
        {
            continue;
        }
        artifact_repo::insert(
            pool,
            project.id,
            &CreateArtifact {
                name: name.to_string(),
                artifact_type: Some(artifact_type),
                version: Some(version.to_string()).filter(|v| !v.is_empty()),
                reference: Some(reference.to_string()),
                owner: None,
                description: None,
            },
        )
        .await?;
        created += 1;
    }
    println!("[done] Created {created} artifacts");
    Ok(())
}
