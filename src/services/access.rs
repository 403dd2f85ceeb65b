//! Access levels checked against a record's owning organization.

use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    Manage,
}

/// Check that `actor` has `access` to records owned by `organization_id`.
pub fn check(actor: &CurrentUser, organization_id: Uuid, access: Access) -> Result<(), AppError> {
    match access {
        Access::Read => actor.ensure_tenant(organization_id),
        Access::Write => actor.ensure_can_write(organization_id),
        Access::Manage => actor.ensure_can_manage(organization_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    #[test]
    fn levels_map_to_role_checks() {
        let org = Uuid::new_v4();
        let member = CurrentUser {
            id: Uuid::new_v4(),
            username: "m".to_string(),
            role: UserRole::Member,
            organization_id: Some(org),
        };
        assert!(check(&member, org, Access::Read).is_ok());
        assert!(check(&member, org, Access::Write).is_ok());
        assert!(check(&member, org, Access::Manage).is_err());
        assert!(check(&member, Uuid::new_v4(), Access::Read).is_err());
    }
}
