use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::{
        PaginationQuery,
        schools::{SchoolCreate, SchoolResponse, SchoolUpdate},
        users::CurrentUser,
    },
    auth::permissions,
    db::{
        handlers::{Repository, Schools, schools::SchoolFilter},
        models::schools::{SchoolCreateDBRequest, SchoolUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{Operation, Resource, SchoolId},
};

/// List schools for the caller's implementer
#[utoipa::path(
    get,
    path = "/schools",
    tag = "schools",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of schools", body = [SchoolResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn list_schools(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<SchoolResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Schools::new(&mut pool_conn);

    let schools = repo
        .list(&SchoolFilter {
            implementer_id: current_user.implementer_id,
            skip: query.skip(),
            limit: query.limit(),
        })
        .await?;

    Ok(Json(schools.into_iter().map(SchoolResponse::from).collect()))
}

/// Create a school (operations_manager)
#[utoipa::path(
    post,
    path = "/schools",
    tag = "schools",
    request_body = SchoolCreate,
    responses(
        (status = 201, description = "School created", body = SchoolResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Name already in use"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn create_school(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<SchoolCreate>,
) -> Result<(StatusCode, Json<SchoolResponse>)> {
    permissions::require_operations(&current_user, Resource::Schools, Operation::Create)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Schools::new(&mut pool_conn);

    let school = repo
        .create(&SchoolCreateDBRequest {
            implementer_id: current_user.implementer_id,
            name: request.name,
            district: request.district,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(SchoolResponse::from(school))))
}

/// Get one school
#[utoipa::path(
    get,
    path = "/schools/{id}",
    tag = "schools",
    params(("id" = SchoolId, Path, description = "School ID")),
    responses(
        (status = 200, description = "The school", body = SchoolResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn get_school(
    State(state): State<AppState>,
    Path(id): Path<SchoolId>,
    current_user: CurrentUser,
) -> Result<Json<SchoolResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Schools::new(&mut pool_conn);

    let school = repo
        .get_by_id((current_user.implementer_id, id))
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "School".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(SchoolResponse::from(school)))
}

/// Update a school (operations_manager)
#[utoipa::path(
    patch,
    path = "/schools/{id}",
    tag = "schools",
    params(("id" = SchoolId, Path, description = "School ID")),
    request_body = SchoolUpdate,
    responses(
        (status = 200, description = "Updated school", body = SchoolResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn update_school(
    State(state): State<AppState>,
    Path(id): Path<SchoolId>,
    current_user: CurrentUser,
    Json(request): Json<SchoolUpdate>,
) -> Result<Json<SchoolResponse>> {
    permissions::require_operations(&current_user, Resource::Schools, Operation::Update)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Schools::new(&mut pool_conn);

    let school = repo
        .update(
            (current_user.implementer_id, id),
            &SchoolUpdateDBRequest {
                name: request.name,
                district: request.district,
            },
        )
        .await?;

    Ok(Json(SchoolResponse::from(school)))
}

/// Delete a school (operations_manager)
#[utoipa::path(
    delete,
    path = "/schools/{id}",
    tag = "schools",
    params(("id" = SchoolId, Path, description = "School ID")),
    responses(
        (status = 204, description = "School deleted"),
        (status = 400, description = "School still referenced"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn delete_school(State(state): State<AppState>, Path(id): Path<SchoolId>, current_user: CurrentUser) -> Result<StatusCode> {
    permissions::require_operations(&current_user, Resource::Schools, Operation::Delete)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Schools::new(&mut pool_conn);

    if repo.delete((current_user.implementer_id, id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "School".to_string(),
            id: id.to_string(),
        })
    }
}
