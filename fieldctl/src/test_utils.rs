//! Shared constructors for tests: in-memory databases, seeded accounts, and
//! a fully-wired router.

use crate::{
    AppState, Config, build_router,
    api::models::users::{Role, UserResponse},
    auth::password,
    db::handlers::{ApiKeys, Fellows, Implementers, Repository, Schools, Sessions, Users},
    db::models::{
        api_keys::ApiKeyCreateDBRequest,
        fellows::{FellowCreateDBRequest, FellowDBResponse, FellowStatus},
        implementers::{ImplementerCreateDBRequest, ImplementerDBResponse},
        schools::{SchoolCreateDBRequest, SchoolDBResponse},
        sessions::{SessionCreateDBRequest, SessionDBResponse},
        users::UserCreateDBRequest,
    },
    migrator,
    types::{FellowId, ImplementerId, SchoolId},
};
use axum::Router;
use chrono::NaiveDate;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

/// Config with a fixed secret key and default policy settings
pub fn create_test_config() -> Config {
    Config {
        secret_key: Some("test-secret-key".to_string()),
        ..Default::default()
    }
}

/// Fresh in-memory database with all migrations applied.
///
/// One pooled connection: every handle sees the same `:memory:` database.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");

    migrator().run(&pool).await.expect("run migrations");
    pool
}

pub fn create_test_state(pool: SqlitePool) -> AppState {
    AppState::builder().db(pool).config(create_test_config()).build()
}

/// The full application router over the given pool
pub fn create_test_app(pool: SqlitePool) -> Router {
    build_router(create_test_state(pool)).expect("build router")
}

pub async fn create_test_implementer(pool: &SqlitePool, name: &str) -> ImplementerDBResponse {
    let mut conn = pool.acquire().await.expect("acquire connection");
    let mut repo = Implementers::new(&mut conn);
    repo.create(&ImplementerCreateDBRequest { name: name.to_string() })
        .await
        .expect("create implementer")
}

/// Create an account with a random email plus an API key for it.
/// Returns the user and the bearer secret.
pub async fn create_test_user(
    pool: &SqlitePool,
    implementer_id: ImplementerId,
    role: Role,
    is_admin: bool,
) -> (UserResponse, String) {
    let mut conn = pool.acquire().await.expect("acquire connection");

    let mut users_repo = Users::new(&mut conn);
    let user = users_repo
        .create(&UserCreateDBRequest {
            implementer_id,
            email: format!("user-{}@example.com", Uuid::new_v4()),
            display_name: None,
            role,
            is_admin,
            password_hash: None,
        })
        .await
        .expect("create user");

    let secret = password::generate_api_key_secret();
    let mut keys_repo = ApiKeys::new(&mut conn);
    keys_repo
        .create(&ApiKeyCreateDBRequest {
            user_id: user.id,
            name: "test".to_string(),
            secret: secret.clone(),
        })
        .await
        .expect("create api key");

    (UserResponse::from(user), secret)
}

/// Create an account that can log in with the given email and password
pub async fn create_test_user_with_password(
    pool: &SqlitePool,
    implementer_id: ImplementerId,
    role: Role,
    email: &str,
    plain_password: &str,
) -> UserResponse {
    let password_hash = password::hash_string(plain_password).expect("hash password");

    let mut conn = pool.acquire().await.expect("acquire connection");
    let mut users_repo = Users::new(&mut conn);
    let user = users_repo
        .create(&UserCreateDBRequest {
            implementer_id,
            email: email.to_string(),
            display_name: None,
            role,
            is_admin: false,
            password_hash: Some(password_hash),
        })
        .await
        .expect("create user");

    UserResponse::from(user)
}

pub async fn create_test_school(pool: &SqlitePool, implementer_id: ImplementerId, name: &str) -> SchoolDBResponse {
    let mut conn = pool.acquire().await.expect("acquire connection");
    let mut repo = Schools::new(&mut conn);
    repo.create(&SchoolCreateDBRequest {
        implementer_id,
        name: name.to_string(),
        district: None,
    })
    .await
    .expect("create school")
}

pub async fn create_test_fellow(
    pool: &SqlitePool,
    implementer_id: ImplementerId,
    school_id: SchoolId,
    session_rate_cents: i64,
) -> FellowDBResponse {
    let mut conn = pool.acquire().await.expect("acquire connection");
    let mut repo = Fellows::new(&mut conn);
    repo.create(&FellowCreateDBRequest {
        implementer_id,
        school_id,
        name: "Test Fellow".to_string(),
        email: format!("fellow-{}@example.com", Uuid::new_v4()),
        status: FellowStatus::Active,
        session_rate_cents,
    })
    .await
    .expect("create fellow")
}

pub async fn create_test_session(
    pool: &SqlitePool,
    implementer_id: ImplementerId,
    school_id: SchoolId,
    fellow_id: FellowId,
    session_date: NaiveDate,
) -> SessionDBResponse {
    let mut conn = pool.acquire().await.expect("acquire connection");
    let mut repo = Sessions::new(&mut conn);
    repo.create(&SessionCreateDBRequest {
        implementer_id,
        school_id,
        fellow_id,
        session_date,
    })
    .await
    .expect("create session")
}
