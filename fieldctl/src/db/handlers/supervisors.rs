//! Database repository for supervisors.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::supervisors::{SupervisorCreateDBRequest, SupervisorDBResponse, SupervisorUpdateDBRequest},
};
use crate::types::{ImplementerId, SchoolId, SupervisorId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use uuid::Uuid;

const SUPERVISOR_COLUMNS: &str = "id, implementer_id, school_id, name, email, created_at";

/// Filter for listing supervisors
#[derive(Debug, Clone)]
pub struct SupervisorFilter {
    pub implementer_id: ImplementerId,
    pub school_id: Option<SchoolId>,
    pub skip: i64,
    pub limit: i64,
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Supervisor {
    id: SupervisorId,
    implementer_id: ImplementerId,
    school_id: SchoolId,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl From<Supervisor> for SupervisorDBResponse {
    fn from(row: Supervisor) -> Self {
        Self {
            id: row.id,
            implementer_id: row.implementer_id,
            school_id: row.school_id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

pub struct Supervisors<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Supervisors<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Supervisors<'c> {
    type CreateRequest = SupervisorCreateDBRequest;
    type UpdateRequest = SupervisorUpdateDBRequest;
    type Response = SupervisorDBResponse;
    type Id = (ImplementerId, SupervisorId);
    type Filter = SupervisorFilter;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            INSERT INTO supervisors (id, implementer_id, school_id, name, email, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {SUPERVISOR_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Supervisor>(&sql)
            .bind(Uuid::new_v4())
            .bind(request.implementer_id)
            .bind(request.school_id)
            .bind(&request.name)
            .bind(&request.email)
            .bind(Utc::now())
            .fetch_one(&mut *self.db)
            .await?;

        Ok(SupervisorDBResponse::from(row))
    }

    async fn get_by_id(&mut self, (implementer_id, id): Self::Id) -> Result<Option<Self::Response>> {
        let sql = format!("SELECT {SUPERVISOR_COLUMNS} FROM supervisors WHERE id = ? AND implementer_id = ?");
        let row = sqlx::query_as::<_, Supervisor>(&sql)
            .bind(id)
            .bind(implementer_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(SupervisorDBResponse::from))
    }

    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut sql = format!("SELECT {SUPERVISOR_COLUMNS} FROM supervisors WHERE implementer_id = ?");
        if filter.school_id.is_some() {
            sql.push_str(" AND school_id = ?");
        }
        sql.push_str(" ORDER BY name LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, Supervisor>(&sql).bind(filter.implementer_id);
        if let Some(school_id) = filter.school_id {
            query = query.bind(school_id);
        }
        let rows = query
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(SupervisorDBResponse::from).collect())
    }

    async fn update(&mut self, (implementer_id, id): Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            UPDATE supervisors
            SET school_id = COALESCE(?, school_id),
                name = COALESCE(?, name),
                email = COALESCE(?, email)
            WHERE id = ? AND implementer_id = ?
            RETURNING {SUPERVISOR_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Supervisor>(&sql)
            .bind(request.school_id)
            .bind(&request.name)
            .bind(&request.email)
            .bind(id)
            .bind(implementer_id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(SupervisorDBResponse::from(row))
    }

    async fn delete(&mut self, (implementer_id, id): Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM supervisors WHERE id = ? AND implementer_id = ?")
            .bind(id)
            .bind(implementer_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
