//! JWT authentication extractor and tenant access checks.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRole;
use crate::services::auth as auth_service;
use crate::AppState;

/// Authenticated user extracted from JWT Bearer token.
///
/// Use as an Axum extractor in handlers that require authentication:
/// ```ignore
/// async fn handler(current_user: CurrentUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub organization_id: Option<Uuid>,
}

impl CurrentUser {
    pub fn is_platform_admin(&self) -> bool {
        self.role == UserRole::PlatformAdmin
    }

    /// The organization a listing should be restricted to, `None` for platform admins.
    pub fn tenant_filter(&self) -> Option<Uuid> {
        if self.is_platform_admin() {
            None
        } else {
            // Non-admin tokens always carry an org; fall back to nil so nothing matches.
            Some(self.organization_id.unwrap_or_else(Uuid::nil))
        }
    }

    /// Reject access to records owned by another organization.
    pub fn ensure_tenant(&self, organization_id: Uuid) -> Result<(), AppError> {
        if self.is_platform_admin() || self.organization_id == Some(organization_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Record belongs to another organization".to_string(),
            ))
        }
    }

    /// Tenant check plus a role that may create and edit records.
    pub fn ensure_can_write(&self, organization_id: Uuid) -> Result<(), AppError> {
        self.ensure_tenant(organization_id)?;
        if !self.role.can_write() {
            return Err(AppError::Forbidden("Write access required".to_string()));
        }
        Ok(())
    }

    /// Tenant check plus a role that may delete and manage records.
    pub fn ensure_can_manage(&self, organization_id: Uuid) -> Result<(), AppError> {
        self.ensure_tenant(organization_id)?;
        if !self.role.can_manage() {
            return Err(AppError::Forbidden(
                "Organization admin access required".to_string(),
            ));
        }
        Ok(())
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized)?;

        let claims = auth_service::validate_token(bearer.token(), &state.config.jwt_secret)?;

        if claims.token_type != auth_service::ACCESS_TOKEN {
            return Err(AppError::Unauthorized);
        }

        let user_id: Uuid = claims
            .user_id
            .parse()
            .map_err(|_| AppError::Unauthorized)?;

        let role = auth_service::parse_role(&claims.role)?;

        Ok(CurrentUser {
            id: user_id,
            username: claims.sub,
            role,
            organization_id: claims.org_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole, org: Option<Uuid>) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: "tester".to_string(),
            role,
            organization_id: org,
        }
    }

    #[test]
    fn platform_admin_crosses_tenants() {
        let admin = user(UserRole::PlatformAdmin, None);
        assert!(admin.ensure_can_manage(Uuid::new_v4()).is_ok());
        assert_eq!(admin.tenant_filter(), None);
    }

    #[test]
    fn member_is_confined_to_own_tenant() {
        let org = Uuid::new_v4();
        let member = user(UserRole::Member, Some(org));
        assert!(member.ensure_tenant(org).is_ok());
        assert!(member.ensure_can_write(org).is_ok());
        assert!(matches!(
            member.ensure_tenant(Uuid::new_v4()),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            member.ensure_can_manage(org),
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(member.tenant_filter(), Some(org));
    }

    #[test]
    fn viewer_is_read_only() {
        let org = Uuid::new_v4();
        let viewer = user(UserRole::Viewer, Some(org));
        assert!(viewer.ensure_tenant(org).is_ok());
        assert!(viewer.ensure_can_write(org).is_err());
    }

    #[test]
    fn org_admin_manages_only_own_tenant() {
        let org = Uuid::new_v4();
        let org_admin = user(UserRole::OrgAdmin, Some(org));
        assert!(org_admin.ensure_can_manage(org).is_ok());
        assert!(org_admin.ensure_can_manage(Uuid::new_v4()).is_err());
    }

    #[test]
    fn orgless_non_admin_matches_nothing() {
        let stray = user(UserRole::Member, None);
        assert_eq!(stray.tenant_filter(), Some(Uuid::nil()));
        assert!(stray.ensure_tenant(Uuid::new_v4()).is_err());
    }
}
