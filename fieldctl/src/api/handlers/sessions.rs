use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::{
        sessions::{ListSessionsQuery, SessionCreate, SessionResponse, SessionUpdate},
        users::CurrentUser,
    },
    auth::permissions,
    db::{
        handlers::{Repository, Sessions, sessions::SessionFilter},
        models::sessions::{SessionCreateDBRequest, SessionUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{Operation, Resource, SessionId},
};

/// List sessions for the caller's implementer
#[utoipa::path(
    get,
    path = "/sessions",
    tag = "sessions",
    params(ListSessionsQuery),
    responses(
        (status = 200, description = "List of sessions", body = [SessionResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<ListSessionsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<SessionResponse>>> {
    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Sessions::new(&mut pool_conn);

    let sessions = repo
        .list(&SessionFilter {
            implementer_id: current_user.implementer_id,
            school_id: query.school_id,
            fellow_id: query.fellow_id,
            skip,
            limit,
        })
        .await?;

    Ok(Json(sessions.into_iter().map(SessionResponse::from).collect()))
}

/// Schedule a session (field_coordinator)
#[utoipa::path(
    post,
    path = "/sessions",
    tag = "sessions",
    request_body = SessionCreate,
    responses(
        (status = 201, description = "Session created", body = SessionResponse),
        (status = 400, description = "Invalid school or fellow reference"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn create_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<SessionCreate>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    permissions::require_coordinator(&current_user, Resource::Sessions, Operation::Create)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Sessions::new(&mut pool_conn);

    let session = repo
        .create(&SessionCreateDBRequest {
            implementer_id: current_user.implementer_id,
            school_id: request.school_id,
            fellow_id: request.fellow_id,
            session_date: request.session_date,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(SessionResponse::from(session))))
}

/// Get one session
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "sessions",
    params(("id" = SessionId, Path, description = "Session ID")),
    responses(
        (status = 200, description = "The session", body = SessionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    current_user: CurrentUser,
) -> Result<Json<SessionResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Sessions::new(&mut pool_conn);

    let session = repo
        .get_by_id((current_user.implementer_id, id))
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Session".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(SessionResponse::from(session)))
}

/// Update a session, e.g. record that it occurred (field_coordinator)
#[utoipa::path(
    patch,
    path = "/sessions/{id}",
    tag = "sessions",
    params(("id" = SessionId, Path, description = "Session ID")),
    request_body = SessionUpdate,
    responses(
        (status = 200, description = "Updated session", body = SessionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    current_user: CurrentUser,
    Json(request): Json<SessionUpdate>,
) -> Result<Json<SessionResponse>> {
    permissions::require_coordinator(&current_user, Resource::Sessions, Operation::Update)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Sessions::new(&mut pool_conn);

    let session = repo
        .update(
            (current_user.implementer_id, id),
            &SessionUpdateDBRequest {
                session_date: request.session_date,
                occurred: request.occurred,
            },
        )
        .await?;

    Ok(Json(SessionResponse::from(session)))
}

/// Cancel a session (field_coordinator)
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    tag = "sessions",
    params(("id" = SessionId, Path, description = "Session ID")),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn delete_session(State(state): State<AppState>, Path(id): Path<SessionId>, current_user: CurrentUser) -> Result<StatusCode> {
    permissions::require_coordinator(&current_user, Resource::Sessions, Operation::Delete)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Sessions::new(&mut pool_conn);

    if repo.delete((current_user.implementer_id, id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Session".to_string(),
            id: id.to_string(),
        })
    }
}
