//! Database models for payout statements and settlement runs.

use crate::types::{AttendanceId, FellowId, ImplementerId, PayoutStatementId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct PayoutStatementCreateDBRequest {
    pub implementer_id: ImplementerId,
    pub attendance_id: AttendanceId,
    pub fellow_id: FellowId,
    pub amount_cents: i64,
}

#[derive(Debug, Clone)]
pub struct PayoutStatementDBResponse {
    pub id: PayoutStatementId,
    pub implementer_id: ImplementerId,
    pub attendance_id: AttendanceId,
    pub fellow_id: FellowId,
    pub amount_cents: i64,
    /// Set when a settlement run executed this statement
    pub executed_at: Option<DateTime<Utc>>,
    /// Set when the bank confirmed the payment
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Counts reported by one settlement run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementOutcome {
    pub processed_count: i64,
    pub payout_statements_count: i64,
}
