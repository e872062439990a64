use crate::db::models::schools::SchoolDBResponse;
use crate::types::{ImplementerId, SchoolId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SchoolCreate {
    pub name: String,
    pub district: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SchoolUpdate {
    pub name: Option<String>,
    pub district: Option<String>,
}

// Response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SchoolResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: SchoolId,
    #[schema(value_type = String, format = "uuid")]
    pub implementer_id: ImplementerId,
    pub name: String,
    pub district: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SchoolDBResponse> for SchoolResponse {
    fn from(db: SchoolDBResponse) -> Self {
        Self {
            id: db.id,
            implementer_id: db.implementer_id,
            name: db.name,
            district: db.district,
            created_at: db.created_at,
        }
    }
}
