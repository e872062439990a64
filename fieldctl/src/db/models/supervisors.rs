//! Database models for supervisors.

use crate::types::{ImplementerId, SchoolId, SupervisorId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct SupervisorCreateDBRequest {
    pub implementer_id: ImplementerId,
    pub school_id: SchoolId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct SupervisorUpdateDBRequest {
    pub school_id: Option<SchoolId>,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SupervisorDBResponse {
    pub id: SupervisorId,
    pub implementer_id: ImplementerId,
    pub school_id: SchoolId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
