use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::{
        PaginationQuery,
        implementers::{ImplementerCreate, ImplementerResponse, ImplementerUpdate},
        users::CurrentUser,
    },
    auth::permissions,
    db::{
        handlers::{Implementers, Repository, implementers::ImplementerFilter},
        models::implementers::{ImplementerCreateDBRequest, ImplementerUpdateDBRequest},
    },
    errors::{Error, Result},
    types::ImplementerId,
};

/// List implementer organizations (admin only)
#[utoipa::path(
    get,
    path = "/implementers",
    tag = "implementers",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of implementers", body = [ImplementerResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn list_implementers(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<ImplementerResponse>>> {
    permissions::require_admin(&current_user)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Implementers::new(&mut pool_conn);

    let implementers = repo.list(&ImplementerFilter::new(query.skip(), query.limit())).await?;

    Ok(Json(implementers.into_iter().map(ImplementerResponse::from).collect()))
}

/// Create an implementer organization (admin only)
#[utoipa::path(
    post,
    path = "/implementers",
    tag = "implementers",
    request_body = ImplementerCreate,
    responses(
        (status = 201, description = "Implementer created", body = ImplementerResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Name already in use"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn create_implementer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ImplementerCreate>,
) -> Result<(StatusCode, Json<ImplementerResponse>)> {
    permissions::require_admin(&current_user)?;

    if request.name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Implementer name must not be empty".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Implementers::new(&mut pool_conn);

    let implementer = repo.create(&ImplementerCreateDBRequest { name: request.name }).await?;

    Ok((StatusCode::CREATED, Json(ImplementerResponse::from(implementer))))
}

/// Get one implementer (admin only)
#[utoipa::path(
    get,
    path = "/implementers/{id}",
    tag = "implementers",
    params(("id" = ImplementerId, Path, description = "Implementer ID")),
    responses(
        (status = 200, description = "The implementer", body = ImplementerResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn get_implementer(
    State(state): State<AppState>,
    Path(id): Path<ImplementerId>,
    current_user: CurrentUser,
) -> Result<Json<ImplementerResponse>> {
    permissions::require_admin(&current_user)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Implementers::new(&mut pool_conn);

    let implementer = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Implementer".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(ImplementerResponse::from(implementer)))
}

/// Rename an implementer (admin only)
#[utoipa::path(
    patch,
    path = "/implementers/{id}",
    tag = "implementers",
    params(("id" = ImplementerId, Path, description = "Implementer ID")),
    request_body = ImplementerUpdate,
    responses(
        (status = 200, description = "Updated implementer", body = ImplementerResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn update_implementer(
    State(state): State<AppState>,
    Path(id): Path<ImplementerId>,
    current_user: CurrentUser,
    Json(request): Json<ImplementerUpdate>,
) -> Result<Json<ImplementerResponse>> {
    permissions::require_admin(&current_user)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Implementers::new(&mut pool_conn);

    let implementer = repo.update(id, &ImplementerUpdateDBRequest { name: request.name }).await?;

    Ok(Json(ImplementerResponse::from(implementer)))
}

/// Delete an implementer (admin only)
#[utoipa::path(
    delete,
    path = "/implementers/{id}",
    tag = "implementers",
    params(("id" = ImplementerId, Path, description = "Implementer ID")),
    responses(
        (status = 204, description = "Implementer deleted"),
        (status = 400, description = "Implementer still referenced"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn delete_implementer(
    State(state): State<AppState>,
    Path(id): Path<ImplementerId>,
    current_user: CurrentUser,
) -> Result<StatusCode> {
    permissions::require_admin(&current_user)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Implementers::new(&mut pool_conn);

    if repo.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Implementer".to_string(),
            id: id.to_string(),
        })
    }
}
