use crate::db::models::students::{CaseDBResponse, CaseStatus, StudentDBResponse};
use crate::types::{CaseId, FellowId, ImplementerId, SchoolId, StudentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing students
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListStudentsQuery {
    /// Restrict to one school
    #[param(value_type = Option<String>, format = "uuid")]
    pub school_id: Option<SchoolId>,
    #[param(default = 0, minimum = 0)]
    pub skip: Option<i64>,
    #[param(default = 100, minimum = 1, maximum = 1000)]
    pub limit: Option<i64>,
}

// Request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentCreate {
    pub school_id: SchoolId,
    pub name: String,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentUpdate {
    pub school_id: Option<SchoolId>,
    pub name: Option<String>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseCreate {
    /// The fellow handling the case
    pub fellow_id: FellowId,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseUpdate {
    pub fellow_id: Option<FellowId>,
    pub status: Option<CaseStatus>,
    pub notes: Option<String>,
}

// Response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentResponse {
    pub id: StudentId,
    pub implementer_id: ImplementerId,
    pub school_id: SchoolId,
    pub name: String,
    pub grade: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseResponse {
    pub id: CaseId,
    pub implementer_id: ImplementerId,
    pub student_id: StudentId,
    pub fellow_id: FellowId,
    pub status: CaseStatus,
    pub notes: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl From<StudentDBResponse> for StudentResponse {
    fn from(db: StudentDBResponse) -> Self {
        Self {
            id: db.id,
            implementer_id: db.implementer_id,
            school_id: db.school_id,
            name: db.name,
            grade: db.grade,
            created_at: db.created_at,
        }
    }
}

impl From<CaseDBResponse> for CaseResponse {
    fn from(db: CaseDBResponse) -> Self {
        Self {
            id: db.id,
            implementer_id: db.implementer_id,
            student_id: db.student_id,
            fellow_id: db.fellow_id,
            status: db.status,
            notes: db.notes,
            opened_at: db.opened_at,
            closed_at: db.closed_at,
        }
    }
}
