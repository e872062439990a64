use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::{
        students::{CaseCreate, CaseResponse, CaseUpdate, ListStudentsQuery, StudentCreate, StudentResponse, StudentUpdate},
        users::CurrentUser,
    },
    auth::permissions,
    db::{
        handlers::{Cases, Repository, Students, students::StudentFilter},
        models::students::{CaseCreateDBRequest, CaseUpdateDBRequest, StudentCreateDBRequest, StudentUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{CaseId, Operation, Resource, StudentId},
};

/// List students for the caller's implementer
#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    params(ListStudentsQuery),
    responses(
        (status = 200, description = "List of students", body = [StudentResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<ListStudentsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<StudentResponse>>> {
    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Students::new(&mut pool_conn);

    let students = repo
        .list(&StudentFilter {
            implementer_id: current_user.implementer_id,
            school_id: query.school_id,
            skip,
            limit,
        })
        .await?;

    Ok(Json(students.into_iter().map(StudentResponse::from).collect()))
}

/// Enroll a student (field_coordinator)
#[utoipa::path(
    post,
    path = "/students",
    tag = "students",
    request_body = StudentCreate,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn create_student(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<StudentCreate>,
) -> Result<(StatusCode, Json<StudentResponse>)> {
    permissions::require_coordinator(&current_user, Resource::Students, Operation::Create)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Students::new(&mut pool_conn);

    let student = repo
        .create(&StudentCreateDBRequest {
            implementer_id: current_user.implementer_id,
            school_id: request.school_id,
            name: request.name,
            grade: request.grade,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(StudentResponse::from(student))))
}

/// Get one student
#[utoipa::path(
    get,
    path = "/students/{id}",
    tag = "students",
    params(("id" = StudentId, Path, description = "Student ID")),
    responses(
        (status = 200, description = "The student", body = StudentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
    current_user: CurrentUser,
) -> Result<Json<StudentResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Students::new(&mut pool_conn);

    let student = repo
        .get_by_id((current_user.implementer_id, id))
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Student".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(StudentResponse::from(student)))
}

/// Update a student (field_coordinator)
#[utoipa::path(
    patch,
    path = "/students/{id}",
    tag = "students",
    params(("id" = StudentId, Path, description = "Student ID")),
    request_body = StudentUpdate,
    responses(
        (status = 200, description = "Updated student", body = StudentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
    current_user: CurrentUser,
    Json(request): Json<StudentUpdate>,
) -> Result<Json<StudentResponse>> {
    permissions::require_coordinator(&current_user, Resource::Students, Operation::Update)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Students::new(&mut pool_conn);

    let student = repo
        .update(
            (current_user.implementer_id, id),
            &StudentUpdateDBRequest {
                school_id: request.school_id,
                name: request.name,
                grade: request.grade,
            },
        )
        .await?;

    Ok(Json(StudentResponse::from(student)))
}

/// Remove a student (field_coordinator)
#[utoipa::path(
    delete,
    path = "/students/{id}",
    tag = "students",
    params(("id" = StudentId, Path, description = "Student ID")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn delete_student(State(state): State<AppState>, Path(id): Path<StudentId>, current_user: CurrentUser) -> Result<StatusCode> {
    permissions::require_coordinator(&current_user, Resource::Students, Operation::Delete)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Students::new(&mut pool_conn);

    if repo.delete((current_user.implementer_id, id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Student".to_string(),
            id: id.to_string(),
        })
    }
}

/// List a student's clinical cases
#[utoipa::path(
    get,
    path = "/students/{student_id}/cases",
    tag = "students",
    params(("student_id" = StudentId, Path, description = "Student ID")),
    responses(
        (status = 200, description = "The student's cases", body = [CaseResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn list_student_cases(
    State(state): State<AppState>,
    Path(student_id): Path<StudentId>,
    current_user: CurrentUser,
) -> Result<Json<Vec<CaseResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    Students::new(&mut pool_conn)
        .get_by_id((current_user.implementer_id, student_id))
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Student".to_string(),
            id: student_id.to_string(),
        })?;

    let mut cases_repo = Cases::new(&mut pool_conn);
    let cases = cases_repo.list_for_student(current_user.implementer_id, student_id).await?;

    Ok(Json(cases.into_iter().map(CaseResponse::from).collect()))
}

/// Open a clinical case for a student (field_coordinator)
#[utoipa::path(
    post,
    path = "/students/{student_id}/cases",
    tag = "students",
    params(("student_id" = StudentId, Path, description = "Student ID")),
    request_body = CaseCreate,
    responses(
        (status = 201, description = "Case opened", body = CaseResponse),
        (status = 400, description = "Invalid fellow reference"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn create_student_case(
    State(state): State<AppState>,
    Path(student_id): Path<StudentId>,
    current_user: CurrentUser,
    Json(request): Json<CaseCreate>,
) -> Result<(StatusCode, Json<CaseResponse>)> {
    permissions::require_coordinator(&current_user, Resource::Cases, Operation::Create)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    Students::new(&mut pool_conn)
        .get_by_id((current_user.implementer_id, student_id))
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Student".to_string(),
            id: student_id.to_string(),
        })?;

    let mut cases_repo = Cases::new(&mut pool_conn);
    let case = cases_repo
        .create(&CaseCreateDBRequest {
            implementer_id: current_user.implementer_id,
            student_id,
            fellow_id: request.fellow_id,
            notes: request.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CaseResponse::from(case))))
}

/// Update a clinical case (field_coordinator)
#[utoipa::path(
    patch,
    path = "/cases/{id}",
    tag = "students",
    params(("id" = CaseId, Path, description = "Case ID")),
    request_body = CaseUpdate,
    responses(
        (status = 200, description = "Updated case", body = CaseResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn update_case(
    State(state): State<AppState>,
    Path(id): Path<CaseId>,
    current_user: CurrentUser,
    Json(request): Json<CaseUpdate>,
) -> Result<Json<CaseResponse>> {
    permissions::require_coordinator(&current_user, Resource::Cases, Operation::Update)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Cases::new(&mut pool_conn);

    let case = repo
        .update(
            (current_user.implementer_id, id),
            &CaseUpdateDBRequest {
                fellow_id: request.fellow_id,
                status: request.status,
                notes: request.notes,
            },
        )
        .await?;

    Ok(Json(CaseResponse::from(case)))
}
