//! Database repository for API keys.

use crate::api::models::users::Role;
use crate::db::{
    errors::Result,
    models::{api_keys::{ApiKeyCreateDBRequest, ApiKeyDBResponse}, users::UserDBResponse},
};
use crate::types::{ApiKeyId, UserId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use uuid::Uuid;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct ApiKey {
    id: ApiKeyId,
    user_id: UserId,
    name: String,
    secret: String,
    created_at: DateTime<Utc>,
}

impl From<ApiKey> for ApiKeyDBResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            user_id: key.user_id,
            name: key.name,
            secret: key.secret,
            created_at: key.created_at,
        }
    }
}

// Joined row used for bearer authentication
#[derive(Debug, Clone, FromRow)]
struct ApiKeyUser {
    id: UserId,
    implementer_id: Uuid,
    email: String,
    display_name: Option<String>,
    role: Role,
    is_admin: bool,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
}

pub struct ApiKeys<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> ApiKeys<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    pub async fn create(&mut self, request: &ApiKeyCreateDBRequest) -> Result<ApiKeyDBResponse> {
        let key = sqlx::query_as::<_, ApiKey>(
            r#"
            INSERT INTO api_keys (id, user_id, name, secret, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, user_id, name, secret, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(&request.name)
        .bind(&request.secret)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(ApiKeyDBResponse::from(key))
    }

    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<ApiKeyDBResponse>> {
        let keys = sqlx::query_as::<_, ApiKey>(
            "SELECT id, user_id, name, secret, created_at FROM api_keys WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(keys.into_iter().map(ApiKeyDBResponse::from).collect())
    }

    /// Delete a key owned by the given user. Returns false when the key does
    /// not exist or belongs to someone else.
    pub async fn delete_for_user(&mut self, user_id: UserId, id: ApiKeyId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Resolve a bearer secret to its owning account
    pub async fn find_user_by_secret(&mut self, secret: &str) -> Result<Option<UserDBResponse>> {
        let row = sqlx::query_as::<_, ApiKeyUser>(
            r#"
            SELECT u.id, u.implementer_id, u.email, u.display_name, u.role, u.is_admin, u.password_hash, u.created_at
            FROM api_keys ak
            INNER JOIN users u ON ak.user_id = u.id
            WHERE ak.secret = ?
            "#,
        )
        .bind(secret)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(row.map(|u| UserDBResponse {
            id: u.id,
            implementer_id: u.implementer_id,
            email: u.email,
            display_name: u.display_name,
            role: u.role,
            is_admin: u.is_admin,
            password_hash: u.password_hash,
            created_at: u.created_at,
        }))
    }
}
