use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::{
        fellows::{FellowCreate, FellowResponse, FellowUpdate, ListFellowsQuery},
        users::CurrentUser,
    },
    auth::permissions,
    db::{
        handlers::{Fellows, Repository, fellows::FellowFilter},
        models::fellows::{FellowCreateDBRequest, FellowStatus, FellowUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{FellowId, Operation, Resource},
};

/// List fellows for the caller's implementer
#[utoipa::path(
    get,
    path = "/fellows",
    tag = "fellows",
    params(ListFellowsQuery),
    responses(
        (status = 200, description = "List of fellows", body = [FellowResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn list_fellows(
    State(state): State<AppState>,
    Query(query): Query<ListFellowsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<FellowResponse>>> {
    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Fellows::new(&mut pool_conn);

    let fellows = repo
        .list(&FellowFilter {
            implementer_id: current_user.implementer_id,
            school_id: query.school_id,
            status: query.status,
            skip,
            limit,
        })
        .await?;

    Ok(Json(fellows.into_iter().map(FellowResponse::from).collect()))
}

/// Onboard a fellow (field_coordinator)
#[utoipa::path(
    post,
    path = "/fellows",
    tag = "fellows",
    request_body = FellowCreate,
    responses(
        (status = 201, description = "Fellow created", body = FellowResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already in use"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn create_fellow(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<FellowCreate>,
) -> Result<(StatusCode, Json<FellowResponse>)> {
    permissions::require_coordinator(&current_user, Resource::Fellows, Operation::Create)?;

    if request.session_rate_cents < 0 {
        return Err(Error::BadRequest {
            message: "Session rate must not be negative".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Fellows::new(&mut pool_conn);

    let fellow = repo
        .create(&FellowCreateDBRequest {
            implementer_id: current_user.implementer_id,
            school_id: request.school_id,
            name: request.name,
            email: request.email,
            status: FellowStatus::Active,
            session_rate_cents: request.session_rate_cents,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(FellowResponse::from(fellow))))
}

/// Get one fellow
#[utoipa::path(
    get,
    path = "/fellows/{id}",
    tag = "fellows",
    params(("id" = FellowId, Path, description = "Fellow ID")),
    responses(
        (status = 200, description = "The fellow", body = FellowResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn get_fellow(
    State(state): State<AppState>,
    Path(id): Path<FellowId>,
    current_user: CurrentUser,
) -> Result<Json<FellowResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Fellows::new(&mut pool_conn);

    let fellow = repo
        .get_by_id((current_user.implementer_id, id))
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Fellow".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(FellowResponse::from(fellow)))
}

/// Update a fellow (field_coordinator)
#[utoipa::path(
    patch,
    path = "/fellows/{id}",
    tag = "fellows",
    params(("id" = FellowId, Path, description = "Fellow ID")),
    request_body = FellowUpdate,
    responses(
        (status = 200, description = "Updated fellow", body = FellowResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn update_fellow(
    State(state): State<AppState>,
    Path(id): Path<FellowId>,
    current_user: CurrentUser,
    Json(request): Json<FellowUpdate>,
) -> Result<Json<FellowResponse>> {
    permissions::require_coordinator(&current_user, Resource::Fellows, Operation::Update)?;

    if request.session_rate_cents.is_some_and(|rate| rate < 0) {
        return Err(Error::BadRequest {
            message: "Session rate must not be negative".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Fellows::new(&mut pool_conn);

    let fellow = repo
        .update(
            (current_user.implementer_id, id),
            &FellowUpdateDBRequest {
                school_id: request.school_id,
                name: request.name,
                email: request.email,
                status: request.status,
                session_rate_cents: request.session_rate_cents,
            },
        )
        .await?;

    Ok(Json(FellowResponse::from(fellow)))
}

/// Remove a fellow (field_coordinator)
#[utoipa::path(
    delete,
    path = "/fellows/{id}",
    tag = "fellows",
    params(("id" = FellowId, Path, description = "Fellow ID")),
    responses(
        (status = 204, description = "Fellow deleted"),
        (status = 400, description = "Fellow still referenced"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn delete_fellow(State(state): State<AppState>, Path(id): Path<FellowId>, current_user: CurrentUser) -> Result<StatusCode> {
    permissions::require_coordinator(&current_user, Resource::Fellows, Operation::Delete)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Fellows::new(&mut pool_conn);

    if repo.delete((current_user.implementer_id, id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Fellow".to_string(),
            id: id.to_string(),
        })
    }
}
