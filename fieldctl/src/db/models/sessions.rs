//! Database models for intervention sessions.

use crate::types::{FellowId, ImplementerId, SchoolId, SessionId};
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone)]
pub struct SessionCreateDBRequest {
    pub implementer_id: ImplementerId,
    pub school_id: SchoolId,
    pub fellow_id: FellowId,
    pub session_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct SessionUpdateDBRequest {
    pub session_date: Option<NaiveDate>,
    pub occurred: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct SessionDBResponse {
    pub id: SessionId,
    pub implementer_id: ImplementerId,
    pub school_id: SchoolId,
    pub fellow_id: FellowId,
    pub session_date: NaiveDate,
    pub occurred: bool,
    pub created_at: DateTime<Utc>,
}
