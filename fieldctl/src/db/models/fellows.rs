//! Database models for fellows (field staff).

use crate::types::{FellowId, ImplementerId, SchoolId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fellow lifecycle status stored as TEXT in the database.
///
/// Dropped-out fellows are excluded from payout settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FellowStatus {
    Active,
    OnLeave,
    DroppedOut,
}

#[derive(Debug, Clone)]
pub struct FellowCreateDBRequest {
    pub implementer_id: ImplementerId,
    pub school_id: SchoolId,
    pub name: String,
    pub email: String,
    pub status: FellowStatus,
    pub session_rate_cents: i64,
}

#[derive(Debug, Clone)]
pub struct FellowUpdateDBRequest {
    pub school_id: Option<SchoolId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<FellowStatus>,
    pub session_rate_cents: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct FellowDBResponse {
    pub id: FellowId,
    pub implementer_id: ImplementerId,
    pub school_id: SchoolId,
    pub name: String,
    pub email: String,
    pub status: FellowStatus,
    pub session_rate_cents: i64,
    pub created_at: DateTime<Utc>,
}
