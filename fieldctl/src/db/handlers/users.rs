//! Database repository for dashboard accounts.

use crate::api::models::users::Role;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
};
use crate::types::{ImplementerId, UserId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, implementer_id, email, display_name, role, is_admin, password_hash, created_at";

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub implementer_id: Option<ImplementerId>,
    pub skip: i64,
    pub limit: i64,
}

impl UserFilter {
    pub fn new(implementer_id: Option<ImplementerId>, skip: i64, limit: i64) -> Self {
        Self {
            implementer_id,
            skip,
            limit,
        }
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct User {
    id: UserId,
    implementer_id: ImplementerId,
    email: String,
    display_name: Option<String>,
    role: Role,
    is_admin: bool,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<User> for UserDBResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            implementer_id: user.implementer_id,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
            is_admin: user.is_admin,
            password_hash: user.password_hash,
            created_at: user.created_at,
        }
    }
}

pub struct Users<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Look up an account by email (emails are globally unique)
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(UserDBResponse::from))
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            INSERT INTO users (id, implementer_id, email, display_name, role, is_admin, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(request.implementer_id)
            .bind(&request.email)
            .bind(&request.display_name)
            .bind(request.role)
            .bind(request.is_admin)
            .bind(&request.password_hash)
            .bind(Utc::now())
            .fetch_one(&mut *self.db)
            .await?;

        Ok(UserDBResponse::from(user))
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(UserDBResponse::from))
    }

    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut sql = format!("SELECT {USER_COLUMNS} FROM users");
        if filter.implementer_id.is_some() {
            sql.push_str(" WHERE implementer_id = ?");
        }
        sql.push_str(" ORDER BY email LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, User>(&sql);
        if let Some(implementer_id) = filter.implementer_id {
            query = query.bind(implementer_id);
        }
        let users = query
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(users.into_iter().map(UserDBResponse::from).collect())
    }

    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            UPDATE users
            SET display_name = COALESCE(?, display_name),
                role = COALESCE(?, role),
                password_hash = COALESCE(?, password_hash)
            WHERE id = ?
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&request.display_name)
            .bind(request.role)
            .bind(&request.password_hash)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(UserDBResponse::from(user))
    }

    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_implementer, create_test_pool};

    #[tokio::test]
    async fn test_create_and_fetch_user() {
        let pool = create_test_pool().await;
        let implementer = create_test_implementer(&pool, "acme-education").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo
            .create(&UserCreateDBRequest {
                implementer_id: implementer.id,
                email: "ops@example.com".to_string(),
                display_name: Some("Ops".to_string()),
                role: Role::OperationsManager,
                is_admin: false,
                password_hash: None,
            })
            .await
            .unwrap();

        let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ops@example.com");
        assert_eq!(by_id.role, Role::OperationsManager);
        assert_eq!(by_id.implementer_id, implementer.id);

        let by_email = repo.get_user_by_email("ops@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let pool = create_test_pool().await;
        let implementer = create_test_implementer(&pool, "acme-education").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let request = UserCreateDBRequest {
            implementer_id: implementer.id,
            email: "dup@example.com".to_string(),
            display_name: None,
            role: Role::Viewer,
            is_admin: false,
            password_hash: None,
        };
        repo.create(&request).await.unwrap();

        let err = repo.create(&request).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_role() {
        let pool = create_test_pool().await;
        let implementer = create_test_implementer(&pool, "acme-education").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo
            .create(&UserCreateDBRequest {
                implementer_id: implementer.id,
                email: "viewer@example.com".to_string(),
                display_name: None,
                role: Role::Viewer,
                is_admin: false,
                password_hash: None,
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                created.id,
                &UserUpdateDBRequest {
                    display_name: None,
                    role: Some(Role::FieldCoordinator),
                    password_hash: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, Role::FieldCoordinator);
        // Untouched fields survive the partial update
        assert_eq!(updated.email, "viewer@example.com");
    }
}
