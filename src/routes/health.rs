//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    pub storage: String,
}

/// Liveness probe: always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Public readiness label for the database. Error detail only goes to the log.
fn database_status(ping: Result<(), sqlx::Error>) -> (bool, String) {
    match ping {
        Ok(()) => (true, "connected".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            (false, "unavailable".to_string())
        }
    }
}

/// Readiness probe: checks database connectivity and the upload directory.
pub async fn ready(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthStatus>>) {
    let ping = sqlx::query("SELECT 1").execute(&state.db).await.map(|_| ());
    let (db_ok, database) = database_status(ping);

    let storage_ok = state.storage.is_ready().await;
    if !storage_ok {
        tracing::warn!(root = %state.storage.root().display(), "Upload directory not writable");
    }
    let storage = if storage_ok { "writable" } else { "unavailable" }.to_string();

    let healthy = db_ok && storage_ok;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        ApiResponse::success(HealthStatus {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            database,
            storage,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_failure_detail_is_not_exposed() {
        let (ok, label) = database_status(Err(sqlx::Error::PoolTimedOut));
        assert!(!ok);
        assert_eq!(label, "unavailable");

        assert_eq!(database_status(Ok(())), (true, "connected".to_string()));
    }
}
