//! Route definitions for the Dossier API.

pub mod acceptance;
pub mod artifacts;
pub mod auth;
pub mod evidence;
pub mod health;
pub mod interviews;
pub mod organizations;
pub mod projects;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, patch, post, put};
use axum::Router;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::AppState;

/// Multipart framing allowance on top of the file size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Response body for successful deletes.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: Uuid,
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION]);

    match HeaderValue::from_str(frontend_url) {
        Ok(origin) if frontend_url != "*" => layer.allow_origin(origin),
        _ => {
            tracing::warn!(frontend_url, "Allowing any CORS origin");
            layer.allow_origin(Any)
        }
    }
}

fn upload_routes(state: &AppState) -> Router<AppState> {
    let limit = state
        .config
        .upload_max_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route(
            "/interviews/{id}/evidence",
            get(evidence::list).post(evidence::create),
        )
        .route("/evidence/{id}/file", put(evidence::replace_file))
        .route(
            "/projects/{id}/artifacts/import",
            post(artifacts::import),
        )
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(limit))
                .layer(RequestBodyLimitLayer::new(limit)),
        )
}

/// Build the full application router with all `/api/v1` routes and layers.
pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/users", post(auth::create_user))
        .route("/auth/me", get(auth::me));

    let org_routes = Router::new()
        .route(
            "/organizations",
            get(organizations::list).post(organizations::create),
        )
        .route(
            "/organizations/{id}",
            get(organizations::get_by_id)
                .put(organizations::update)
                .delete(organizations::delete),
        )
        .route(
            "/organizations/{id}/projects",
            get(projects::list).post(projects::create),
        )
        .route(
            "/projects/{id}",
            get(projects::get_by_id)
                .put(projects::update)
                .delete(projects::delete),
        );

    let interview_routes = Router::new()
        .route(
            "/projects/{id}/interviews",
            get(interviews::list).post(interviews::create),
        )
        .route(
            "/interviews/{id}",
            get(interviews::get_by_id)
                .put(interviews::update)
                .delete(interviews::delete),
        )
        .route(
            "/interviews/{id}/evidence/next-code",
            get(evidence::next_code),
        )
        .route(
            "/evidence/{id}",
            get(evidence::get_by_id)
                .put(evidence::update)
                .delete(evidence::delete),
        )
        .route("/evidence/{id}/download", get(evidence::download));

    let record_routes = Router::new()
        .route(
            "/projects/{id}/acceptance-records",
            get(acceptance::list).post(acceptance::create),
        )
        .route(
            "/acceptance-records/{id}",
            get(acceptance::get_by_id)
                .put(acceptance::update)
                .delete(acceptance::delete),
        )
        .route("/acceptance-records/{id}/decision", patch(acceptance::decide))
        .route(
            "/projects/{id}/artifacts",
            get(artifacts::list).post(artifacts::create),
        )
        .route(
            "/artifacts/{id}",
            get(artifacts::get_by_id)
                .put(artifacts::update)
                .delete(artifacts::delete),
        );

    let api = Router::new()
        .merge(auth_routes)
        .merge(org_routes)
        .merge(interview_routes)
        .merge(record_routes)
        .merge(upload_routes(&state));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors_layer(&state.config.frontend_url)),
        )
        .with_state(state)
}
