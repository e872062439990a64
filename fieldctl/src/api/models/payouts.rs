use crate::db::models::payouts::{PayoutStatementDBResponse, SettlementOutcome};
use crate::types::{AttendanceId, FellowId, ImplementerId, PayoutStatementId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing payout statements
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPayoutStatementsQuery {
    #[param(value_type = Option<String>, format = "uuid")]
    pub fellow_id: Option<FellowId>,
    /// Filter by whether the statement has been executed by a settlement run
    pub executed: Option<bool>,
    /// Filter by whether the payment has been bank-confirmed
    pub confirmed: Option<bool>,
    #[param(default = 0, minimum = 0)]
    pub skip: Option<i64>,
    #[param(default = 100, minimum = 1, maximum = 1000)]
    pub limit: Option<i64>,
}

// Response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayoutStatementResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: PayoutStatementId,
    #[schema(value_type = String, format = "uuid")]
    pub implementer_id: ImplementerId,
    #[schema(value_type = String, format = "uuid")]
    pub attendance_id: AttendanceId,
    #[schema(value_type = String, format = "uuid")]
    pub fellow_id: FellowId,
    pub amount_cents: i64,
    pub executed_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Result of one settlement run
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettlementRunResponse {
    /// Attendance records marked as processed
    pub processed_count: i64,
    /// Payout statements marked as executed
    pub payout_statements_count: i64,
}

impl From<PayoutStatementDBResponse> for PayoutStatementResponse {
    fn from(db: PayoutStatementDBResponse) -> Self {
        Self {
            id: db.id,
            implementer_id: db.implementer_id,
            attendance_id: db.attendance_id,
            fellow_id: db.fellow_id,
            amount_cents: db.amount_cents,
            executed_at: db.executed_at,
            confirmed_at: db.confirmed_at,
            created_at: db.created_at,
        }
    }
}

impl From<SettlementOutcome> for SettlementRunResponse {
    fn from(outcome: SettlementOutcome) -> Self {
        Self {
            processed_count: outcome.processed_count,
            payout_statements_count: outcome.payout_statements_count,
        }
    }
}
