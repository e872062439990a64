use crate::db::models::supervisors::SupervisorDBResponse;
use crate::types::{ImplementerId, SchoolId, SupervisorId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing supervisors
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListSupervisorsQuery {
    /// Restrict to one school
    pub school_id: Option<SchoolId>,
    #[param(default = 0, minimum = 0)]
    pub skip: Option<i64>,
    #[param(default = 100, minimum = 1, maximum = 1000)]
    pub limit: Option<i64>,
}

// Request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupervisorCreate {
    pub school_id: SchoolId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupervisorUpdate {
    pub school_id: Option<SchoolId>,
    pub name: Option<String>,
    pub email: Option<String>,
}

// Response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupervisorResponse {
    pub id: SupervisorId,
    pub implementer_id: ImplementerId,
    pub school_id: SchoolId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<SupervisorDBResponse> for SupervisorResponse {
    fn from(db: SupervisorDBResponse) -> Self {
        Self {
            id: db.id,
            implementer_id: db.implementer_id,
            school_id: db.school_id,
            name: db.name,
            email: db.email,
            created_at: db.created_at,
        }
    }
}
