use crate::db::models::implementers::ImplementerDBResponse;
use crate::types::ImplementerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImplementerCreate {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImplementerUpdate {
    pub name: Option<String>,
}

// Response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImplementerResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ImplementerId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<ImplementerDBResponse> for ImplementerResponse {
    fn from(db: ImplementerDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            created_at: db.created_at,
        }
    }
}
