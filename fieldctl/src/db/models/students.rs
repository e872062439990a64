//! Database models for students and their clinical cases.

use crate::types::{CaseId, FellowId, ImplementerId, SchoolId, StudentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Clinical case status stored as TEXT in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Open,
    Monitoring,
    Closed,
}

#[derive(Debug, Clone)]
pub struct StudentCreateDBRequest {
    pub implementer_id: ImplementerId,
    pub school_id: SchoolId,
    pub name: String,
    pub grade: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StudentUpdateDBRequest {
    pub school_id: Option<SchoolId>,
    pub name: Option<String>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StudentDBResponse {
    pub id: StudentId,
    pub implementer_id: ImplementerId,
    pub school_id: SchoolId,
    pub name: String,
    pub grade: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CaseCreateDBRequest {
    pub implementer_id: ImplementerId,
    pub student_id: StudentId,
    pub fellow_id: FellowId,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CaseUpdateDBRequest {
    pub fellow_id: Option<FellowId>,
    pub status: Option<CaseStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CaseDBResponse {
    pub id: CaseId,
    pub implementer_id: ImplementerId,
    pub student_id: StudentId,
    pub fellow_id: FellowId,
    pub status: CaseStatus,
    pub notes: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}
