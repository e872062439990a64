use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::Utc;

use crate::{
    AppState,
    api::models::{
        attendance::{AttendanceResponse, ListAttendanceQuery, MarkAttendanceRequest, MarkAttendanceResponse, MarkOutcome},
        users::CurrentUser,
    },
    auth::permissions,
    db::{
        handlers::{Attendance, Fellows, Payouts, Repository, Sessions, attendance::AttendanceFilter},
        models::{attendance::AttendanceMarkDBRequest, payouts::PayoutStatementCreateDBRequest},
    },
    errors::{Error, Result},
    policy::{CutoffPolicy, MarkDecision},
    types::{AttendanceId, Operation, Resource, SessionId},
};

/// List attendance records for the caller's implementer
#[utoipa::path(
    get,
    path = "/attendance",
    tag = "attendance",
    params(ListAttendanceQuery),
    responses(
        (status = 200, description = "List of attendance records", body = [AttendanceResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn list_attendance(
    State(state): State<AppState>,
    Query(query): Query<ListAttendanceQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<AttendanceResponse>>> {
    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Attendance::new(&mut pool_conn);

    let records = repo
        .list(&AttendanceFilter {
            implementer_id: current_user.implementer_id,
            session_id: query.session_id,
            fellow_id: query.fellow_id,
            skip,
            limit,
        })
        .await?;

    Ok(Json(records.into_iter().map(AttendanceResponse::from).collect()))
}

/// Get one attendance record
#[utoipa::path(
    get,
    path = "/attendance/{id}",
    tag = "attendance",
    params(("id" = AttendanceId, Path, description = "Attendance record ID")),
    responses(
        (status = 200, description = "The attendance record", body = AttendanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn get_attendance(
    State(state): State<AppState>,
    Path(id): Path<AttendanceId>,
    current_user: CurrentUser,
) -> Result<Json<AttendanceResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Attendance::new(&mut pool_conn);

    let record = repo
        .get_by_id((current_user.implementer_id, id))
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Attendance record".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(AttendanceResponse::from(record)))
}

/// Mark a fellow's attendance for a session (field_coordinator)
///
/// Before the cutoff (the configured time on the day after the session) the
/// status change applies immediately. After the cutoff, the request must
/// carry `delayed_payment_confirmed: true`, otherwise the stored status is
/// left untouched and the response asks for confirmation. A record already
/// marked present stays locked once the cutoff has passed, and a record the
/// settlement batch has processed can no longer change at all.
#[utoipa::path(
    post,
    path = "/sessions/{id}/attendance",
    tag = "attendance",
    params(("id" = SessionId, Path, description = "Session ID")),
    request_body = MarkAttendanceRequest,
    responses(
        (status = 200, description = "Outcome of the mark request", body = MarkAttendanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Session or fellow not found"),
        (status = 409, description = "Record already settled"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
#[tracing::instrument(skip(state, request), fields(session_id = %session_id, fellow_id = %request.fellow_id))]
pub async fn mark_attendance(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    current_user: CurrentUser,
    Json(request): Json<MarkAttendanceRequest>,
) -> Result<Json<MarkAttendanceResponse>> {
    permissions::require_coordinator(&current_user, Resource::Attendance, Operation::Update)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let session = Sessions::new(&mut tx)
        .get_by_id((current_user.implementer_id, session_id))
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Session".to_string(),
            id: session_id.to_string(),
        })?;

    let fellow = Fellows::new(&mut tx)
        .get_by_id((current_user.implementer_id, request.fellow_id))
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Fellow".to_string(),
            id: request.fellow_id.to_string(),
        })?;

    let mut attendance_repo = Attendance::new(&mut tx);
    let record = attendance_repo
        .get_or_create(current_user.implementer_id, session.id, fellow.id)
        .await?;

    if record.processed_at.is_some() {
        return Err(Error::Conflict {
            message: "Attendance has already been settled for payout and can no longer change".to_string(),
        });
    }

    let policy = CutoffPolicy::new(state.config.attendance.cutoff_time);
    let now = Utc::now();
    let decision = policy.evaluate_mark(
        session.session_date,
        now.naive_utc(),
        record.attended,
        request.delayed_payment_confirmed,
    );

    let (outcome, record) = match decision {
        MarkDecision::Apply | MarkDecision::ApplyDelayed => {
            let delayed_confirmed_at = matches!(decision, MarkDecision::ApplyDelayed).then_some(now);
            let updated = attendance_repo
                .apply_mark(
                    record.id,
                    &AttendanceMarkDBRequest {
                        attended: request.status.as_flag(),
                        marked_at: now,
                        delayed_confirmed_at,
                    },
                )
                .await?;

            // Keep payout statements in step with the stored status: an
            // attended mark carries one statement at the fellow's session
            // rate, anything else drops the provisional statements.
            let mut payouts_repo = Payouts::new(&mut tx);
            if updated.attended == Some(true) {
                if payouts_repo.list_for_attendance(updated.id).await?.is_empty() {
                    payouts_repo
                        .create(&PayoutStatementCreateDBRequest {
                            implementer_id: current_user.implementer_id,
                            attendance_id: updated.id,
                            fellow_id: fellow.id,
                            amount_cents: fellow.session_rate_cents,
                        })
                        .await?;
                }
            } else {
                payouts_repo.delete_unexecuted_for_attendance(updated.id).await?;
            }

            (MarkOutcome::Applied, updated)
        }
        MarkDecision::ConfirmationRequired => (MarkOutcome::ConfirmationRequired, record),
        MarkDecision::Locked => (MarkOutcome::Locked, record),
    };

    // Commit in every outcome: get_or_create may have inserted the unmarked
    // record, which is worth keeping.
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(MarkAttendanceResponse {
        outcome,
        record: AttendanceResponse::from(record),
    }))
}
