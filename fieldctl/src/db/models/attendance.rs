//! Database models for attendance records.

use crate::types::{AttendanceId, FellowId, ImplementerId, SessionId};
use chrono::{DateTime, Utc};

/// A status change to persist on an attendance record.
///
/// `delayed_confirmed_at` is set when the mark was applied past the cutoff
/// with a delayed-payment acknowledgment.
#[derive(Debug, Clone)]
pub struct AttendanceMarkDBRequest {
    pub attended: Option<bool>,
    pub marked_at: DateTime<Utc>,
    pub delayed_confirmed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct AttendanceDBResponse {
    pub id: AttendanceId,
    pub implementer_id: ImplementerId,
    pub session_id: SessionId,
    pub fellow_id: FellowId,
    /// NULL = unmarked, 1 = present, 0 = missed
    pub attended: Option<bool>,
    pub marked_at: Option<DateTime<Utc>>,
    pub delayed_confirmed_at: Option<DateTime<Utc>>,
    /// Set by the settlement batch; a processed record is immutable
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
