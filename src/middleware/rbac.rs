//! Role-based access control extractors for Axum handlers.
//!
//! These reject on role alone; tenant ownership is checked by the services
//! once the target record's organization is known.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::AppState;

/// Extractor that requires the Platform_Admin role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_platform_admin() {
            return Err(AppError::Forbidden(
                "Platform admin access required".to_string(),
            ));
        }
        Ok(RequireAdmin(user))
    }
}

/// Extractor that requires Platform_Admin or Org_Admin.
#[derive(Debug, Clone)]
pub struct RequireManager(pub CurrentUser);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.role.can_manage() {
            return Err(AppError::Forbidden(
                "Organization admin access required".to_string(),
            ));
        }
        Ok(RequireManager(user))
    }
}

/// Extractor that requires a role allowed to create and edit records.
#[derive(Debug, Clone)]
pub struct RequireWriter(pub CurrentUser);

impl FromRequestParts<AppState> for RequireWriter {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.role.can_write() {
            return Err(AppError::Forbidden("Write access required".to_string()));
        }
        Ok(RequireWriter(user))
    }
}
