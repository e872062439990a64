//! Database repository for implementer (tenant) organizations.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::implementers::{ImplementerCreateDBRequest, ImplementerDBResponse, ImplementerUpdateDBRequest},
};
use crate::types::ImplementerId;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use uuid::Uuid;

/// Filter for listing implementers
#[derive(Debug, Clone)]
pub struct ImplementerFilter {
    pub skip: i64,
    pub limit: i64,
}

impl ImplementerFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Implementer {
    id: ImplementerId,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<Implementer> for ImplementerDBResponse {
    fn from(row: Implementer) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

pub struct Implementers<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Implementers<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Look up an implementer by its unique name
    pub async fn get_by_name(&mut self, name: &str) -> Result<Option<ImplementerDBResponse>> {
        let row = sqlx::query_as::<_, Implementer>("SELECT id, name, created_at FROM implementers WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(ImplementerDBResponse::from))
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Implementers<'c> {
    type CreateRequest = ImplementerCreateDBRequest;
    type UpdateRequest = ImplementerUpdateDBRequest;
    type Response = ImplementerDBResponse;
    type Id = ImplementerId;
    type Filter = ImplementerFilter;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, Implementer>(
            r#"
            INSERT INTO implementers (id, name, created_at)
            VALUES (?, ?, ?)
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(ImplementerDBResponse::from(row))
    }

    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let row = sqlx::query_as::<_, Implementer>("SELECT id, name, created_at FROM implementers WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(ImplementerDBResponse::from))
    }

    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rows = sqlx::query_as::<_, Implementer>(
            "SELECT id, name, created_at FROM implementers ORDER BY name LIMIT ? OFFSET ?",
        )
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows.into_iter().map(ImplementerDBResponse::from).collect())
    }

    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, Implementer>(
            r#"
            UPDATE implementers
            SET name = COALESCE(?, name)
            WHERE id = ?
            RETURNING id, name, created_at
            "#,
        )
        .bind(&request.name)
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(ImplementerDBResponse::from(row))
    }

    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM implementers WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
