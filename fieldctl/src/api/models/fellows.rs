use crate::db::models::fellows::{FellowDBResponse, FellowStatus};
use crate::types::{FellowId, ImplementerId, SchoolId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// Request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FellowCreate {
    #[schema(value_type = String, format = "uuid")]
    pub school_id: SchoolId,
    pub name: String,
    pub email: String,
    /// Amount payable per attended session, in cents
    pub session_rate_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FellowUpdate {
    #[schema(value_type = Option<String>, format = "uuid")]
    pub school_id: Option<SchoolId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<FellowStatus>,
    pub session_rate_cents: Option<i64>,
}

/// Query parameters for listing fellows
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListFellowsQuery {
    /// Restrict to one school
    #[param(value_type = Option<String>, format = "uuid")]
    pub school_id: Option<SchoolId>,
    /// Restrict to one status
    pub status: Option<FellowStatus>,
    #[param(default = 0, minimum = 0)]
    pub skip: Option<i64>,
    #[param(default = 100, minimum = 1, maximum = 1000)]
    pub limit: Option<i64>,
}

// Response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FellowResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: FellowId,
    #[schema(value_type = String, format = "uuid")]
    pub implementer_id: ImplementerId,
    #[schema(value_type = String, format = "uuid")]
    pub school_id: SchoolId,
    pub name: String,
    pub email: String,
    pub status: FellowStatus,
    pub session_rate_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl From<FellowDBResponse> for FellowResponse {
    fn from(db: FellowDBResponse) -> Self {
        Self {
            id: db.id,
            implementer_id: db.implementer_id,
            school_id: db.school_id,
            name: db.name,
            email: db.email,
            status: db.status,
            session_rate_cents: db.session_rate_cents,
            created_at: db.created_at,
        }
    }
}
