//! Database repository for attendance records.

use crate::db::{
    errors::{DbError, Result},
    models::attendance::{AttendanceDBResponse, AttendanceMarkDBRequest},
};
use crate::types::{AttendanceId, FellowId, ImplementerId, SessionId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use uuid::Uuid;

const ATTENDANCE_COLUMNS: &str =
    "id, implementer_id, session_id, fellow_id, attended, marked_at, delayed_confirmed_at, processed_at, created_at";

/// Filter for listing attendance records
#[derive(Debug, Clone)]
pub struct AttendanceFilter {
    pub implementer_id: ImplementerId,
    pub session_id: Option<SessionId>,
    pub fellow_id: Option<FellowId>,
    pub skip: i64,
    pub limit: i64,
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct AttendanceRecord {
    id: AttendanceId,
    implementer_id: ImplementerId,
    session_id: SessionId,
    fellow_id: FellowId,
    attended: Option<bool>,
    marked_at: Option<DateTime<Utc>>,
    delayed_confirmed_at: Option<DateTime<Utc>>,
    processed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<AttendanceRecord> for AttendanceDBResponse {
    fn from(row: AttendanceRecord) -> Self {
        Self {
            id: row.id,
            implementer_id: row.implementer_id,
            session_id: row.session_id,
            fellow_id: row.fellow_id,
            attended: row.attended,
            marked_at: row.marked_at,
            delayed_confirmed_at: row.delayed_confirmed_at,
            processed_at: row.processed_at,
            created_at: row.created_at,
        }
    }
}

pub struct Attendance<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Attendance<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&mut self, (implementer_id, id): (ImplementerId, AttendanceId)) -> Result<Option<AttendanceDBResponse>> {
        let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance_records WHERE id = ? AND implementer_id = ?");
        let row = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(id)
            .bind(implementer_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(AttendanceDBResponse::from))
    }

    /// Fetch the record for a (session, fellow) pair, creating an unmarked
    /// one if none exists yet.
    pub async fn get_or_create(
        &mut self,
        implementer_id: ImplementerId,
        session_id: SessionId,
        fellow_id: FellowId,
    ) -> Result<AttendanceDBResponse> {
        let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance_records WHERE session_id = ? AND fellow_id = ?");
        let existing = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(session_id)
            .bind(fellow_id)
            .fetch_optional(&mut *self.db)
            .await?;

        if let Some(row) = existing {
            return Ok(AttendanceDBResponse::from(row));
        }

        let sql = format!(
            r#"
            INSERT INTO attendance_records (id, implementer_id, session_id, fellow_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(implementer_id)
            .bind(session_id)
            .bind(fellow_id)
            .bind(Utc::now())
            .fetch_one(&mut *self.db)
            .await?;

        Ok(AttendanceDBResponse::from(row))
    }

    pub async fn list(&mut self, filter: &AttendanceFilter) -> Result<Vec<AttendanceDBResponse>> {
        let mut sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance_records WHERE implementer_id = ?");
        if filter.session_id.is_some() {
            sql.push_str(" AND session_id = ?");
        }
        if filter.fellow_id.is_some() {
            sql.push_str(" AND fellow_id = ?");
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, AttendanceRecord>(&sql).bind(filter.implementer_id);
        if let Some(session_id) = filter.session_id {
            query = query.bind(session_id);
        }
        if let Some(fellow_id) = filter.fellow_id {
            query = query.bind(fellow_id);
        }
        let rows = query
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(AttendanceDBResponse::from).collect())
    }

    /// Persist a status change that the cutoff policy has already approved.
    ///
    /// Refuses to touch a record whose `processed_at` is set: settled
    /// attendance is immutable.
    pub async fn apply_mark(&mut self, id: AttendanceId, request: &AttendanceMarkDBRequest) -> Result<AttendanceDBResponse> {
        let sql = format!(
            r#"
            UPDATE attendance_records
            SET attended = ?, marked_at = ?, delayed_confirmed_at = COALESCE(?, delayed_confirmed_at)
            WHERE id = ? AND processed_at IS NULL
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(request.attended)
            .bind(request.marked_at)
            .bind(request.delayed_confirmed_at)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(AttendanceDBResponse::from(row))
    }
}
