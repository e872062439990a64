//! Role checks for handlers.
//!
//! The `is_admin` flag overrides every role check. Beyond that,
//! `operations_manager` holds all field permissions plus payout settlement,
//! and `field_coordinator` holds the field permissions.

use crate::api::models::users::{CurrentUser, Role};
use crate::errors::{Error, Result};
use crate::types::{Operation, Permission, Resource};

fn check(user: &CurrentUser, allowed: &[Role], resource: Resource, action: Operation) -> Result<()> {
    if user.is_admin || allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(Error::InsufficientPermissions {
            required: Permission::Allow(resource, action),
            action,
            resource: resource.to_string(),
        })
    }
}

/// Platform administration: implementers, user accounts
pub fn require_admin(user: &CurrentUser) -> Result<()> {
    if user.is_admin {
        Ok(())
    } else {
        Err(Error::InsufficientPermissions {
            required: Permission::Admin,
            action: Operation::Execute,
            resource: "platform administration".to_string(),
        })
    }
}

/// Operations-manager actions: school management, payout settlement, statement confirmation
pub fn require_operations(user: &CurrentUser, resource: Resource, action: Operation) -> Result<()> {
    check(user, &[Role::OperationsManager], resource, action)
}

/// Field actions: fellows, supervisors, students, cases, sessions, attendance marking
pub fn require_coordinator(user: &CurrentUser, resource: Resource, action: Operation) -> Result<()> {
    check(user, &[Role::OperationsManager, Role::FieldCoordinator], resource, action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user_with(role: Role, is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            implementer_id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            display_name: None,
            role,
            is_admin,
        }
    }

    #[test]
    fn test_viewer_cannot_mutate() {
        let viewer = user_with(Role::Viewer, false);
        assert!(require_coordinator(&viewer, Resource::Sessions, Operation::Create).is_err());
        assert!(require_operations(&viewer, Resource::Payouts, Operation::Execute).is_err());
        assert!(require_admin(&viewer).is_err());
    }

    #[test]
    fn test_coordinator_cannot_settle_payouts() {
        let coordinator = user_with(Role::FieldCoordinator, false);
        assert!(require_coordinator(&coordinator, Resource::Attendance, Operation::Update).is_ok());
        assert!(require_operations(&coordinator, Resource::Payouts, Operation::Execute).is_err());
    }

    #[test]
    fn test_operations_manager_holds_field_permissions() {
        let ops = user_with(Role::OperationsManager, false);
        assert!(require_coordinator(&ops, Resource::Attendance, Operation::Update).is_ok());
        assert!(require_operations(&ops, Resource::Payouts, Operation::Execute).is_ok());
        assert!(require_admin(&ops).is_err());
    }

    #[test]
    fn test_admin_overrides_roles() {
        let admin = user_with(Role::Viewer, true);
        assert!(require_coordinator(&admin, Resource::Attendance, Operation::Update).is_ok());
        assert!(require_operations(&admin, Resource::Payouts, Operation::Execute).is_ok());
        assert!(require_admin(&admin).is_ok());
    }

    #[test]
    fn test_error_is_forbidden() {
        let viewer = user_with(Role::Viewer, false);
        let err = require_operations(&viewer, Resource::Payouts, Operation::Execute).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }
}
