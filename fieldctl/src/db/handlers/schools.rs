//! Database repository for schools.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::schools::{SchoolCreateDBRequest, SchoolDBResponse, SchoolUpdateDBRequest},
};
use crate::types::{ImplementerId, SchoolId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use uuid::Uuid;

const SCHOOL_COLUMNS: &str = "id, implementer_id, name, district, created_at";

/// Filter for listing schools
#[derive(Debug, Clone)]
pub struct SchoolFilter {
    pub implementer_id: ImplementerId,
    pub skip: i64,
    pub limit: i64,
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct School {
    id: SchoolId,
    implementer_id: ImplementerId,
    name: String,
    district: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<School> for SchoolDBResponse {
    fn from(row: School) -> Self {
        Self {
            id: row.id,
            implementer_id: row.implementer_id,
            name: row.name,
            district: row.district,
            created_at: row.created_at,
        }
    }
}

pub struct Schools<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Schools<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Schools<'c> {
    type CreateRequest = SchoolCreateDBRequest;
    type UpdateRequest = SchoolUpdateDBRequest;
    type Response = SchoolDBResponse;
    type Id = (ImplementerId, SchoolId);
    type Filter = SchoolFilter;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            INSERT INTO schools (id, implementer_id, name, district, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {SCHOOL_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, School>(&sql)
            .bind(Uuid::new_v4())
            .bind(request.implementer_id)
            .bind(&request.name)
            .bind(&request.district)
            .bind(Utc::now())
            .fetch_one(&mut *self.db)
            .await?;

        Ok(SchoolDBResponse::from(row))
    }

    async fn get_by_id(&mut self, (implementer_id, id): Self::Id) -> Result<Option<Self::Response>> {
        let sql = format!("SELECT {SCHOOL_COLUMNS} FROM schools WHERE id = ? AND implementer_id = ?");
        let row = sqlx::query_as::<_, School>(&sql)
            .bind(id)
            .bind(implementer_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(SchoolDBResponse::from))
    }

    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let sql = format!("SELECT {SCHOOL_COLUMNS} FROM schools WHERE implementer_id = ? ORDER BY name LIMIT ? OFFSET ?");
        let rows = sqlx::query_as::<_, School>(&sql)
            .bind(filter.implementer_id)
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(SchoolDBResponse::from).collect())
    }

    async fn update(&mut self, (implementer_id, id): Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            UPDATE schools
            SET name = COALESCE(?, name), district = COALESCE(?, district)
            WHERE id = ? AND implementer_id = ?
            RETURNING {SCHOOL_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, School>(&sql)
            .bind(&request.name)
            .bind(&request.district)
            .bind(id)
            .bind(implementer_id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(SchoolDBResponse::from(row))
    }

    async fn delete(&mut self, (implementer_id, id): Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM schools WHERE id = ? AND implementer_id = ?")
            .bind(id)
            .bind(implementer_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
