use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::{
        api_keys::{ApiKeyCreate, ApiKeyResponse},
        users::CurrentUser,
    },
    auth::password,
    db::{handlers::ApiKeys, models::api_keys::ApiKeyCreateDBRequest},
    errors::{Error, Result},
    types::ApiKeyId,
};

/// List the caller's API keys
#[utoipa::path(
    get,
    path = "/users/current/api-keys",
    tag = "api-keys",
    responses(
        (status = 200, description = "List of API keys (secrets omitted)", body = [ApiKeyResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn list_api_keys(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<ApiKeyResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = ApiKeys::new(&mut pool_conn);

    let keys = repo.list_for_user(current_user.id).await?;

    Ok(Json(keys.into_iter().map(ApiKeyResponse::from).collect()))
}

/// Create an API key for the caller
#[utoipa::path(
    post,
    path = "/users/current/api-keys",
    tag = "api-keys",
    request_body = ApiKeyCreate,
    responses(
        (status = 201, description = "API key created; the secret is only returned here", body = ApiKeyResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn create_api_key(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ApiKeyCreate>,
) -> Result<(StatusCode, Json<ApiKeyResponse>)> {
    let secret = password::generate_api_key_secret();

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = ApiKeys::new(&mut pool_conn);

    let key = repo
        .create(&ApiKeyCreateDBRequest {
            user_id: current_user.id,
            name: request.name,
            secret,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiKeyResponse::with_secret(key))))
}

/// Revoke one of the caller's API keys
#[utoipa::path(
    delete,
    path = "/users/current/api-keys/{id}",
    tag = "api-keys",
    params(("id" = ApiKeyId, Path, description = "API key ID")),
    responses(
        (status = 204, description = "API key revoked"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn delete_api_key(
    State(state): State<AppState>,
    Path(id): Path<ApiKeyId>,
    current_user: CurrentUser,
) -> Result<StatusCode> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = ApiKeys::new(&mut pool_conn);

    if repo.delete_for_user(current_user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "API key".to_string(),
            id: id.to_string(),
        })
    }
}
