//! Database repository for intervention sessions.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::sessions::{SessionCreateDBRequest, SessionDBResponse, SessionUpdateDBRequest},
};
use crate::types::{FellowId, ImplementerId, SchoolId, SessionId};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqliteConnection};
use uuid::Uuid;

const SESSION_COLUMNS: &str = "id, implementer_id, school_id, fellow_id, session_date, occurred, created_at";

/// Filter for listing sessions
#[derive(Debug, Clone)]
pub struct SessionFilter {
    pub implementer_id: ImplementerId,
    pub school_id: Option<SchoolId>,
    pub fellow_id: Option<FellowId>,
    pub skip: i64,
    pub limit: i64,
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Session {
    id: SessionId,
    implementer_id: ImplementerId,
    school_id: SchoolId,
    fellow_id: FellowId,
    session_date: NaiveDate,
    occurred: bool,
    created_at: DateTime<Utc>,
}

impl From<Session> for SessionDBResponse {
    fn from(row: Session) -> Self {
        Self {
            id: row.id,
            implementer_id: row.implementer_id,
            school_id: row.school_id,
            fellow_id: row.fellow_id,
            session_date: row.session_date,
            occurred: row.occurred,
            created_at: row.created_at,
        }
    }
}

pub struct Sessions<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Sessions<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Sessions<'c> {
    type CreateRequest = SessionCreateDBRequest;
    type UpdateRequest = SessionUpdateDBRequest;
    type Response = SessionDBResponse;
    type Id = (ImplementerId, SessionId);
    type Filter = SessionFilter;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            INSERT INTO sessions (id, implementer_id, school_id, fellow_id, session_date, occurred, created_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            RETURNING {SESSION_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Session>(&sql)
            .bind(Uuid::new_v4())
            .bind(request.implementer_id)
            .bind(request.school_id)
            .bind(request.fellow_id)
            .bind(request.session_date)
            .bind(Utc::now())
            .fetch_one(&mut *self.db)
            .await?;

        Ok(SessionDBResponse::from(row))
    }

    async fn get_by_id(&mut self, (implementer_id, id): Self::Id) -> Result<Option<Self::Response>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ? AND implementer_id = ?");
        let row = sqlx::query_as::<_, Session>(&sql)
            .bind(id)
            .bind(implementer_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(SessionDBResponse::from))
    }

    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE implementer_id = ?");
        if filter.school_id.is_some() {
            sql.push_str(" AND school_id = ?");
        }
        if filter.fellow_id.is_some() {
            sql.push_str(" AND fellow_id = ?");
        }
        sql.push_str(" ORDER BY session_date DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, Session>(&sql).bind(filter.implementer_id);
        if let Some(school_id) = filter.school_id {
            query = query.bind(school_id);
        }
        if let Some(fellow_id) = filter.fellow_id {
            query = query.bind(fellow_id);
        }
        let rows = query
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(SessionDBResponse::from).collect())
    }

    async fn update(&mut self, (implementer_id, id): Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            UPDATE sessions
            SET session_date = COALESCE(?, session_date),
                occurred = COALESCE(?, occurred)
            WHERE id = ? AND implementer_id = ?
            RETURNING {SESSION_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Session>(&sql)
            .bind(request.session_date)
            .bind(request.occurred)
            .bind(id)
            .bind(implementer_id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(SessionDBResponse::from(row))
    }

    async fn delete(&mut self, (implementer_id, id): Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ? AND implementer_id = ?")
            .bind(id)
            .bind(implementer_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
