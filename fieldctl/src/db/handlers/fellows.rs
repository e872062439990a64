//! Database repository for fellows.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::fellows::{FellowCreateDBRequest, FellowDBResponse, FellowStatus, FellowUpdateDBRequest},
};
use crate::types::{FellowId, ImplementerId, SchoolId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use uuid::Uuid;

const FELLOW_COLUMNS: &str = "id, implementer_id, school_id, name, email, status, session_rate_cents, created_at";

/// Filter for listing fellows
#[derive(Debug, Clone)]
pub struct FellowFilter {
    pub implementer_id: ImplementerId,
    pub school_id: Option<SchoolId>,
    pub status: Option<FellowStatus>,
    pub skip: i64,
    pub limit: i64,
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Fellow {
    id: FellowId,
    implementer_id: ImplementerId,
    school_id: SchoolId,
    name: String,
    email: String,
    status: FellowStatus,
    session_rate_cents: i64,
    created_at: DateTime<Utc>,
}

impl From<Fellow> for FellowDBResponse {
    fn from(row: Fellow) -> Self {
        Self {
            id: row.id,
            implementer_id: row.implementer_id,
            school_id: row.school_id,
            name: row.name,
            email: row.email,
            status: row.status,
            session_rate_cents: row.session_rate_cents,
            created_at: row.created_at,
        }
    }
}

pub struct Fellows<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Fellows<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Fellows<'c> {
    type CreateRequest = FellowCreateDBRequest;
    type UpdateRequest = FellowUpdateDBRequest;
    type Response = FellowDBResponse;
    type Id = (ImplementerId, FellowId);
    type Filter = FellowFilter;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            INSERT INTO fellows (id, implementer_id, school_id, name, email, status, session_rate_cents, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {FELLOW_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Fellow>(&sql)
            .bind(Uuid::new_v4())
            .bind(request.implementer_id)
            .bind(request.school_id)
            .bind(&request.name)
            .bind(&request.email)
            .bind(request.status)
            .bind(request.session_rate_cents)
            .bind(Utc::now())
            .fetch_one(&mut *self.db)
            .await?;

        Ok(FellowDBResponse::from(row))
    }

    async fn get_by_id(&mut self, (implementer_id, id): Self::Id) -> Result<Option<Self::Response>> {
        let sql = format!("SELECT {FELLOW_COLUMNS} FROM fellows WHERE id = ? AND implementer_id = ?");
        let row = sqlx::query_as::<_, Fellow>(&sql)
            .bind(id)
            .bind(implementer_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(FellowDBResponse::from))
    }

    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut sql = format!("SELECT {FELLOW_COLUMNS} FROM fellows WHERE implementer_id = ?");
        if filter.school_id.is_some() {
            sql.push_str(" AND school_id = ?");
        }
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(" ORDER BY name LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, Fellow>(&sql).bind(filter.implementer_id);
        if let Some(school_id) = filter.school_id {
            query = query.bind(school_id);
        }
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        let rows = query
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(FellowDBResponse::from).collect())
    }

    async fn update(&mut self, (implementer_id, id): Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            UPDATE fellows
            SET school_id = COALESCE(?, school_id),
                name = COALESCE(?, name),
                email = COALESCE(?, email),
                status = COALESCE(?, status),
                session_rate_cents = COALESCE(?, session_rate_cents)
            WHERE id = ? AND implementer_id = ?
            RETURNING {FELLOW_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Fellow>(&sql)
            .bind(request.school_id)
            .bind(&request.name)
            .bind(&request.email)
            .bind(request.status)
            .bind(request.session_rate_cents)
            .bind(id)
            .bind(implementer_id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(FellowDBResponse::from(row))
    }

    async fn delete(&mut self, (implementer_id, id): Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM fellows WHERE id = ? AND implementer_id = ?")
            .bind(id)
            .bind(implementer_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
