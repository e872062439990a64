use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::{
        supervisors::{ListSupervisorsQuery, SupervisorCreate, SupervisorResponse, SupervisorUpdate},
        users::CurrentUser,
    },
    auth::permissions,
    db::{
        handlers::{Repository, Supervisors, supervisors::SupervisorFilter},
        models::supervisors::{SupervisorCreateDBRequest, SupervisorUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{Operation, Resource, SupervisorId},
};

/// List supervisors for the caller's implementer
#[utoipa::path(
    get,
    path = "/supervisors",
    tag = "supervisors",
    params(ListSupervisorsQuery),
    responses(
        (status = 200, description = "List of supervisors", body = [SupervisorResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn list_supervisors(
    State(state): State<AppState>,
    Query(query): Query<ListSupervisorsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<SupervisorResponse>>> {
    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Supervisors::new(&mut pool_conn);

    let supervisors = repo
        .list(&SupervisorFilter {
            implementer_id: current_user.implementer_id,
            school_id: query.school_id,
            skip,
            limit,
        })
        .await?;

    Ok(Json(supervisors.into_iter().map(SupervisorResponse::from).collect()))
}

/// Onboard a supervisor (field_coordinator)
#[utoipa::path(
    post,
    path = "/supervisors",
    tag = "supervisors",
    request_body = SupervisorCreate,
    responses(
        (status = 201, description = "Supervisor created", body = SupervisorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already in use"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn create_supervisor(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<SupervisorCreate>,
) -> Result<(StatusCode, Json<SupervisorResponse>)> {
    permissions::require_coordinator(&current_user, Resource::Supervisors, Operation::Create)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Supervisors::new(&mut pool_conn);

    let supervisor = repo
        .create(&SupervisorCreateDBRequest {
            implementer_id: current_user.implementer_id,
            school_id: request.school_id,
            name: request.name,
            email: request.email,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(SupervisorResponse::from(supervisor))))
}

/// Get one supervisor
#[utoipa::path(
    get,
    path = "/supervisors/{id}",
    tag = "supervisors",
    params(("id" = SupervisorId, Path, description = "Supervisor ID")),
    responses(
        (status = 200, description = "The supervisor", body = SupervisorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn get_supervisor(
    State(state): State<AppState>,
    Path(id): Path<SupervisorId>,
    current_user: CurrentUser,
) -> Result<Json<SupervisorResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Supervisors::new(&mut pool_conn);

    let supervisor = repo
        .get_by_id((current_user.implementer_id, id))
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Supervisor".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(SupervisorResponse::from(supervisor)))
}

/// Update a supervisor (field_coordinator)
#[utoipa::path(
    patch,
    path = "/supervisors/{id}",
    tag = "supervisors",
    params(("id" = SupervisorId, Path, description = "Supervisor ID")),
    request_body = SupervisorUpdate,
    responses(
        (status = 200, description = "Updated supervisor", body = SupervisorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn update_supervisor(
    State(state): State<AppState>,
    Path(id): Path<SupervisorId>,
    current_user: CurrentUser,
    Json(request): Json<SupervisorUpdate>,
) -> Result<Json<SupervisorResponse>> {
    permissions::require_coordinator(&current_user, Resource::Supervisors, Operation::Update)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Supervisors::new(&mut pool_conn);

    let supervisor = repo
        .update(
            (current_user.implementer_id, id),
            &SupervisorUpdateDBRequest {
                school_id: request.school_id,
                name: request.name,
                email: request.email,
            },
        )
        .await?;

    Ok(Json(SupervisorResponse::from(supervisor)))
}

/// Remove a supervisor (field_coordinator)
#[utoipa::path(
    delete,
    path = "/supervisors/{id}",
    tag = "supervisors",
    params(("id" = SupervisorId, Path, description = "Supervisor ID")),
    responses(
        (status = 204, description = "Supervisor deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn delete_supervisor(
    State(state): State<AppState>,
    Path(id): Path<SupervisorId>,
    current_user: CurrentUser,
) -> Result<StatusCode> {
    permissions::require_coordinator(&current_user, Resource::Supervisors, Operation::Delete)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Supervisors::new(&mut pool_conn);

    if repo.delete((current_user.implementer_id, id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Supervisor".to_string(),
            id: id.to_string(),
        })
    }
}
