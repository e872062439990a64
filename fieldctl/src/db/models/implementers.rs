//! Database models for implementer (tenant) organizations.

use crate::types::ImplementerId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct ImplementerCreateDBRequest {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ImplementerUpdateDBRequest {
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImplementerDBResponse {
    pub id: ImplementerId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
