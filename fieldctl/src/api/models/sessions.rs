use crate::db::models::sessions::SessionDBResponse;
use crate::types::{FellowId, ImplementerId, SchoolId, SessionId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// Request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionCreate {
    #[schema(value_type = String, format = "uuid")]
    pub school_id: SchoolId,
    #[schema(value_type = String, format = "uuid")]
    pub fellow_id: FellowId,
    /// Calendar date the session is scheduled for
    pub session_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionUpdate {
    pub session_date: Option<NaiveDate>,
    /// Whether the session actually took place
    pub occurred: Option<bool>,
}

/// Query parameters for listing sessions
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListSessionsQuery {
    #[param(value_type = Option<String>, format = "uuid")]
    pub school_id: Option<SchoolId>,
    #[param(value_type = Option<String>, format = "uuid")]
    pub fellow_id: Option<FellowId>,
    #[param(default = 0, minimum = 0)]
    pub skip: Option<i64>,
    #[param(default = 100, minimum = 1, maximum = 1000)]
    pub limit: Option<i64>,
}

// Response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: SessionId,
    #[schema(value_type = String, format = "uuid")]
    pub implementer_id: ImplementerId,
    #[schema(value_type = String, format = "uuid")]
    pub school_id: SchoolId,
    #[schema(value_type = String, format = "uuid")]
    pub fellow_id: FellowId,
    pub session_date: NaiveDate,
    pub occurred: bool,
    pub created_at: DateTime<Utc>,
}

impl From<SessionDBResponse> for SessionResponse {
    fn from(db: SessionDBResponse) -> Self {
        Self {
            id: db.id,
            implementer_id: db.implementer_id,
            school_id: db.school_id,
            fellow_id: db.fellow_id,
            session_date: db.session_date,
            occurred: db.occurred,
            created_at: db.created_at,
        }
    }
}
