//! Database models for API keys.

use crate::types::{ApiKeyId, UserId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct ApiKeyCreateDBRequest {
    pub user_id: UserId,
    pub name: String,
    pub secret: String,
}

#[derive(Debug, Clone)]
pub struct ApiKeyDBResponse {
    pub id: ApiKeyId,
    pub user_id: UserId,
    pub name: String,
    pub secret: String,
    pub created_at: DateTime<Utc>,
}
