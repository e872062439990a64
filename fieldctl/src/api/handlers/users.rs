use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    AppState,
    api::models::users::{CurrentUser, UserCreate, UserResponse, UserUpdate},
    auth::{password, permissions},
    db::{
        handlers::{Repository, Users, users::UserFilter},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{ImplementerId, UserId},
};

/// Query parameters for listing users
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    /// Restrict to one implementer
    pub implementer_id: Option<ImplementerId>,
    #[param(default = 0, minimum = 0)]
    pub skip: Option<i64>,
    #[param(default = 100, minimum = 1, maximum = 1000)]
    pub limit: Option<i64>,
}

/// List dashboard accounts (admin only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "List of users", body = [UserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<UserResponse>>> {
    permissions::require_admin(&current_user)?;

    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    let users = repo.list(&UserFilter::new(query.implementer_id, skip, limit)).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Create a dashboard account (admin only)
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = UserCreate,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already registered"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    permissions::require_admin(&current_user)?;

    // Hash the password on a blocking thread to avoid blocking the async runtime
    let password_hash = match request.password {
        Some(ref plain) => {
            let password_config = &state.config.auth.password;
            if plain.len() < password_config.min_length {
                return Err(Error::BadRequest {
                    message: format!("Password must be at least {} characters", password_config.min_length),
                });
            }
            if plain.len() > password_config.max_length {
                return Err(Error::BadRequest {
                    message: format!("Password must be no more than {} characters", password_config.max_length),
                });
            }
            let plain = plain.clone();
            let hash = tokio::task::spawn_blocking(move || password::hash_string(&plain))
                .await
                .map_err(|e| Error::Internal {
                    operation: format!("spawn password hashing task: {e}"),
                })??;
            Some(hash)
        }
        None => None,
    };

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    let user = repo
        .create(&UserCreateDBRequest {
            implementer_id: request.implementer_id,
            email: request.email,
            display_name: request.display_name,
            role: request.role,
            is_admin: request.is_admin,
            password_hash,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Get one dashboard account (admin only)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = UserId, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    current_user: CurrentUser,
) -> Result<Json<UserResponse>> {
    permissions::require_admin(&current_user)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    let user = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(UserResponse::from(user)))
}

/// Update a dashboard account (admin only)
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    params(("id" = UserId, Path, description = "User ID")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    current_user: CurrentUser,
    Json(request): Json<UserUpdate>,
) -> Result<Json<UserResponse>> {
    permissions::require_admin(&current_user)?;

    let password_hash = match request.password {
        Some(ref plain) => {
            let plain = plain.clone();
            let hash = tokio::task::spawn_blocking(move || password::hash_string(&plain))
                .await
                .map_err(|e| Error::Internal {
                    operation: format!("spawn password hashing task: {e}"),
                })??;
            Some(hash)
        }
        None => None,
    };

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    let user = repo
        .update(
            id,
            &UserUpdateDBRequest {
                display_name: request.display_name,
                role: request.role,
                password_hash,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Delete a dashboard account (admin only)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = UserId, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<UserId>, current_user: CurrentUser) -> Result<StatusCode> {
    permissions::require_admin(&current_user)?;

    if id == current_user.id {
        return Err(Error::BadRequest {
            message: "You cannot delete your own account".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    if repo.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "User".to_string(),
            id: id.to_string(),
        })
    }
}
