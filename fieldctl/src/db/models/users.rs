//! Database models for dashboard accounts.

use crate::api::models::users::Role;
use crate::types::{ImplementerId, UserId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub implementer_id: ImplementerId,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub is_admin: bool,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UserUpdateDBRequest {
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UserDBResponse {
    pub id: UserId,
    pub implementer_id: ImplementerId,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub is_admin: bool,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}
