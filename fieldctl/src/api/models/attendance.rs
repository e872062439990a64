use crate::db::models::attendance::AttendanceDBResponse;
use crate::types::{AttendanceId, FellowId, ImplementerId, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Attendance status as exposed on the wire. Maps onto the stored
/// nullable flag: unmarked = NULL, attended = true, missed = false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Attended,
    Missed,
    Unmarked,
}

impl AttendanceStatus {
    pub fn as_flag(self) -> Option<bool> {
        match self {
            AttendanceStatus::Attended => Some(true),
            AttendanceStatus::Missed => Some(false),
            AttendanceStatus::Unmarked => None,
        }
    }

    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => AttendanceStatus::Attended,
            Some(false) => AttendanceStatus::Missed,
            None => AttendanceStatus::Unmarked,
        }
    }
}

/// Outcome of a mark-attendance request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MarkOutcome {
    /// The status change was persisted
    Applied,
    /// The cutoff has passed: the caller must confirm delayed payment
    ConfirmationRequired,
    /// The record is already marked present and the cutoff has passed
    Locked,
}

// Request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkAttendanceRequest {
    #[schema(value_type = String, format = "uuid")]
    pub fellow_id: FellowId,
    pub status: AttendanceStatus,
    /// Acknowledge that this mark lands after the cutoff and the payout
    /// will be delayed
    #[serde(default)]
    pub delayed_payment_confirmed: bool,
}

/// Query parameters for listing attendance records
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListAttendanceQuery {
    #[param(value_type = Option<String>, format = "uuid")]
    pub session_id: Option<SessionId>,
    #[param(value_type = Option<String>, format = "uuid")]
    pub fellow_id: Option<FellowId>,
    #[param(default = 0, minimum = 0)]
    pub skip: Option<i64>,
    #[param(default = 100, minimum = 1, maximum = 1000)]
    pub limit: Option<i64>,
}

// Response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: AttendanceId,
    #[schema(value_type = String, format = "uuid")]
    pub implementer_id: ImplementerId,
    #[schema(value_type = String, format = "uuid")]
    pub session_id: SessionId,
    #[schema(value_type = String, format = "uuid")]
    pub fellow_id: FellowId,
    pub status: AttendanceStatus,
    pub marked_at: Option<DateTime<Utc>>,
    pub delayed_confirmed_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkAttendanceResponse {
    pub outcome: MarkOutcome,
    pub record: AttendanceResponse,
}

impl From<AttendanceDBResponse> for AttendanceResponse {
    fn from(db: AttendanceDBResponse) -> Self {
        Self {
            id: db.id,
            implementer_id: db.implementer_id,
            session_id: db.session_id,
            fellow_id: db.fellow_id,
            status: AttendanceStatus::from_flag(db.attended),
            marked_at: db.marked_at,
            delayed_confirmed_at: db.delayed_confirmed_at,
            processed_at: db.processed_at,
            created_at: db.created_at,
        }
    }
}
