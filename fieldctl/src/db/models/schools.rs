//! Database models for schools.

use crate::types::{ImplementerId, SchoolId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct SchoolCreateDBRequest {
    pub implementer_id: ImplementerId,
    pub name: String,
    pub district: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SchoolUpdateDBRequest {
    pub name: Option<String>,
    pub district: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SchoolDBResponse {
    pub id: SchoolId,
    pub implementer_id: ImplementerId,
    pub name: String,
    pub district: Option<String>,
    pub created_at: DateTime<Utc>,
}
