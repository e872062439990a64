//! Database repository for payout statements and the settlement batch.

use crate::db::{
    errors::{DbError, Result},
    models::{
        fellows::FellowStatus,
        payouts::{PayoutStatementCreateDBRequest, PayoutStatementDBResponse, SettlementOutcome},
    },
};
use crate::types::{AttendanceId, FellowId, ImplementerId, PayoutStatementId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{Connection, FromRow, SqliteConnection};
use tracing::instrument;
use uuid::Uuid;

const STATEMENT_COLUMNS: &str = "id, implementer_id, attendance_id, fellow_id, amount_cents, executed_at, confirmed_at, created_at";

/// Filter for listing payout statements
#[derive(Debug, Clone)]
pub struct PayoutStatementFilter {
    pub implementer_id: ImplementerId,
    pub fellow_id: Option<FellowId>,
    pub executed: Option<bool>,
    pub confirmed: Option<bool>,
    pub skip: i64,
    pub limit: i64,
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct PayoutStatement {
    id: PayoutStatementId,
    implementer_id: ImplementerId,
    attendance_id: AttendanceId,
    fellow_id: FellowId,
    amount_cents: i64,
    executed_at: Option<DateTime<Utc>>,
    confirmed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<PayoutStatement> for PayoutStatementDBResponse {
    fn from(row: PayoutStatement) -> Self {
        Self {
            id: row.id,
            implementer_id: row.implementer_id,
            attendance_id: row.attendance_id,
            fellow_id: row.fellow_id,
            amount_cents: row.amount_cents,
            executed_at: row.executed_at,
            confirmed_at: row.confirmed_at,
            created_at: row.created_at,
        }
    }
}

pub struct Payouts<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Payouts<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    pub async fn create(&mut self, request: &PayoutStatementCreateDBRequest) -> Result<PayoutStatementDBResponse> {
        let sql = format!(
            r#"
            INSERT INTO payout_statements (id, implementer_id, attendance_id, fellow_id, amount_cents, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {STATEMENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PayoutStatement>(&sql)
            .bind(Uuid::new_v4())
            .bind(request.implementer_id)
            .bind(request.attendance_id)
            .bind(request.fellow_id)
            .bind(request.amount_cents)
            .bind(Utc::now())
            .fetch_one(&mut *self.db)
            .await?;

        Ok(PayoutStatementDBResponse::from(row))
    }

    pub async fn get_by_id(
        &mut self,
        (implementer_id, id): (ImplementerId, PayoutStatementId),
    ) -> Result<Option<PayoutStatementDBResponse>> {
        let sql = format!("SELECT {STATEMENT_COLUMNS} FROM payout_statements WHERE id = ? AND implementer_id = ?");
        let row = sqlx::query_as::<_, PayoutStatement>(&sql)
            .bind(id)
            .bind(implementer_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(PayoutStatementDBResponse::from))
    }

    pub async fn list(&mut self, filter: &PayoutStatementFilter) -> Result<Vec<PayoutStatementDBResponse>> {
        let mut sql = format!("SELECT {STATEMENT_COLUMNS} FROM payout_statements WHERE implementer_id = ?");
        if filter.fellow_id.is_some() {
            sql.push_str(" AND fellow_id = ?");
        }
        match filter.executed {
            Some(true) => sql.push_str(" AND executed_at IS NOT NULL"),
            Some(false) => sql.push_str(" AND executed_at IS NULL"),
            None => {}
        }
        match filter.confirmed {
            Some(true) => sql.push_str(" AND confirmed_at IS NOT NULL"),
            Some(false) => sql.push_str(" AND confirmed_at IS NULL"),
            None => {}
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, PayoutStatement>(&sql).bind(filter.implementer_id);
        if let Some(fellow_id) = filter.fellow_id {
            query = query.bind(fellow_id);
        }
        let rows = query
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(PayoutStatementDBResponse::from).collect())
    }

    pub async fn list_for_attendance(&mut self, attendance_id: AttendanceId) -> Result<Vec<PayoutStatementDBResponse>> {
        let sql = format!("SELECT {STATEMENT_COLUMNS} FROM payout_statements WHERE attendance_id = ? ORDER BY created_at");
        let rows = sqlx::query_as::<_, PayoutStatement>(&sql)
            .bind(attendance_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(PayoutStatementDBResponse::from).collect())
    }

    /// Remove provisional (never executed) statements for an attendance
    /// record, e.g. when its status leaves "attended" before settlement.
    pub async fn delete_unexecuted_for_attendance(&mut self, attendance_id: AttendanceId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM payout_statements WHERE attendance_id = ? AND executed_at IS NULL")
            .bind(attendance_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }

    /// Record bank confirmation of an executed statement
    pub async fn confirm(
        &mut self,
        (implementer_id, id): (ImplementerId, PayoutStatementId),
        confirmed_at: DateTime<Utc>,
    ) -> Result<PayoutStatementDBResponse> {
        let sql = format!(
            r#"
            UPDATE payout_statements
            SET confirmed_at = ?
            WHERE id = ? AND implementer_id = ? AND executed_at IS NOT NULL
            RETURNING {STATEMENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PayoutStatement>(&sql)
            .bind(confirmed_at)
            .bind(id)
            .bind(implementer_id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(PayoutStatementDBResponse::from(row))
    }

    /// Run one settlement batch for an implementer, inside a single
    /// transaction.
    ///
    /// Eligible attendance records are those whose session occurred, whose
    /// fellow is still active, that are marked attended and not yet
    /// processed, and that carry at least one unexecuted statement. For
    /// each, `processed_at` is stamped and then every unexecuted statement
    /// gets `executed_at` - in that order, so a statement is never
    /// observably executed before its attendance is processed. Any error
    /// rolls the whole batch back; re-running only picks up rows the
    /// previous run did not process.
    #[instrument(skip(self), fields(implementer_id = %abbrev_uuid(&implementer_id)), err)]
    pub async fn run_settlement(&mut self, implementer_id: ImplementerId, now: DateTime<Utc>) -> Result<SettlementOutcome> {
        let mut tx = self.db.begin().await?;

        let eligible: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT a.id
            FROM attendance_records a
            INNER JOIN sessions s ON s.id = a.session_id
            INNER JOIN fellows f ON f.id = a.fellow_id
            WHERE a.implementer_id = ?
              AND a.attended = 1
              AND a.processed_at IS NULL
              AND s.occurred = 1
              AND f.status = ?
              AND EXISTS (
                  SELECT 1 FROM payout_statements p
                  WHERE p.attendance_id = a.id AND p.executed_at IS NULL
              )
            ORDER BY a.created_at
            "#,
        )
        .bind(implementer_id)
        .bind(FellowStatus::Active)
        .fetch_all(&mut *tx)
        .await?;

        let mut processed_count: i64 = 0;
        let mut payout_statements_count: i64 = 0;

        for attendance_id in eligible {
            let updated = sqlx::query("UPDATE attendance_records SET processed_at = ? WHERE id = ? AND processed_at IS NULL")
                .bind(now)
                .bind(attendance_id)
                .execute(&mut *tx)
                .await?;
            if updated.rows_affected() == 0 {
                continue;
            }

            let executed = sqlx::query("UPDATE payout_statements SET executed_at = ? WHERE attendance_id = ? AND executed_at IS NULL")
                .bind(now)
                .bind(attendance_id)
                .execute(&mut *tx)
                .await?;

            processed_count += 1;
            payout_statements_count += executed.rows_affected() as i64;
        }

        tx.commit().await?;

        tracing::info!(
            processed_count,
            payout_statements_count,
            "settlement run complete"
        );

        Ok(SettlementOutcome {
            processed_count,
            payout_statements_count,
        })
    }
}
