use crate::db::models::users::UserDBResponse;
use crate::types::{ImplementerId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Platform-wide role of a dashboard account.
///
/// Stored as TEXT in the database. `operations_manager` can additionally
/// trigger payout settlement; `field_coordinator` can manage field data and
/// mark attendance; `viewer` is read-only. The separate `is_admin` flag
/// grants everything including implementer and user management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    OperationsManager,
    FieldCoordinator,
    Viewer,
}

/// The authenticated caller, extracted from a session cookie or API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub implementer_id: ImplementerId,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub is_admin: bool,
}

// Request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserCreate {
    /// Implementer (tenant) the account belongs to
    pub implementer_id: ImplementerId,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    /// Grant platform admin rights
    #[serde(default)]
    pub is_admin: bool,
    /// Initial password; the account cannot log in natively without one
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserUpdate {
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

// Response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub implementer_id: ImplementerId,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            implementer_id: db.implementer_id,
            email: db.email,
            display_name: db.display_name,
            role: db.role,
            is_admin: db.is_admin,
            created_at: db.created_at,
        }
    }
}

impl From<UserResponse> for CurrentUser {
    fn from(user: UserResponse) -> Self {
        Self {
            id: user.id,
            implementer_id: user.implementer_id,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
            is_admin: user.is_admin,
        }
    }
}

impl From<UserDBResponse> for CurrentUser {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            implementer_id: db.implementer_id,
            email: db.email,
            display_name: db.display_name,
            role: db.role,
            is_admin: db.is_admin,
        }
    }
}
