pub mod config;
pub mod db;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

use sqlx::PgPool;

use crate::services::storage::FileStorage;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: config::AppConfig,
    pub storage: FileStorage,
}

impl AppState {
    pub fn new(db: PgPool, config: config::AppConfig) -> Self {
        let storage = FileStorage::new(
            config.upload_dir.clone(),
            config.upload_allowed_extensions.clone(),
        );
        Self {
            db,
            config,
            storage,
        }
    }

    pub fn token_ttl(&self) -> services::auth::TokenTtl {
        services::auth::TokenTtl {
            access_secs: self.config.jwt_access_token_expiry_secs,
            refresh_secs: self.config.jwt_refresh_token_expiry_secs,
        }
    }
}
