use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;

use crate::{
    AppState,
    api::models::{
        payouts::{ListPayoutStatementsQuery, PayoutStatementResponse, SettlementRunResponse},
        users::CurrentUser,
    },
    auth::permissions,
    db::handlers::{Payouts, payouts::PayoutStatementFilter},
    errors::{Error, Result},
    types::{Operation, PayoutStatementId, Resource},
};

/// Run one payout settlement batch (operations_manager)
///
/// Scans the caller's implementer for attendance records that are attended,
/// unprocessed, belong to an occurred session and an active fellow, and
/// carry at least one unexecuted payout statement. Each is marked processed
/// and its statements executed inside a single transaction; on any failure
/// nothing is settled. Re-running is safe: already-processed records are
/// filtered out, so a back-to-back second run reports zero.
#[utoipa::path(
    post,
    path = "/payouts/settlement-runs",
    tag = "payouts",
    responses(
        (status = 200, description = "Settlement counts", body = SettlementRunResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Settlement failed; no partial effects were kept"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn trigger_settlement_run(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<SettlementRunResponse>> {
    permissions::require_operations(&current_user, Resource::Payouts, Operation::Execute)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Payouts::new(&mut pool_conn);

    let outcome = repo.run_settlement(current_user.implementer_id, Utc::now()).await?;

    Ok(Json(SettlementRunResponse::from(outcome)))
}

/// List payout statements (operations_manager)
#[utoipa::path(
    get,
    path = "/payout-statements",
    tag = "payouts",
    params(ListPayoutStatementsQuery),
    responses(
        (status = 200, description = "List of payout statements", body = [PayoutStatementResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn list_payout_statements(
    State(state): State<AppState>,
    Query(query): Query<ListPayoutStatementsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<PayoutStatementResponse>>> {
    permissions::require_operations(&current_user, Resource::Payouts, Operation::Read)?;

    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Payouts::new(&mut pool_conn);

    let statements = repo
        .list(&PayoutStatementFilter {
            implementer_id: current_user.implementer_id,
            fellow_id: query.fellow_id,
            executed: query.executed,
            confirmed: query.confirmed,
            skip,
            limit,
        })
        .await?;

    Ok(Json(statements.into_iter().map(PayoutStatementResponse::from).collect()))
}

/// Get one payout statement (operations_manager)
#[utoipa::path(
    get,
    path = "/payout-statements/{id}",
    tag = "payouts",
    params(("id" = PayoutStatementId, Path, description = "Payout statement ID")),
    responses(
        (status = 200, description = "The payout statement", body = PayoutStatementResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn get_payout_statement(
    State(state): State<AppState>,
    Path(id): Path<PayoutStatementId>,
    current_user: CurrentUser,
) -> Result<Json<PayoutStatementResponse>> {
    permissions::require_operations(&current_user, Resource::Payouts, Operation::Read)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Payouts::new(&mut pool_conn);

    let statement = repo
        .get_by_id((current_user.implementer_id, id))
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Payout statement".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(PayoutStatementResponse::from(statement)))
}

/// Record bank confirmation for an executed statement (operations_manager)
#[utoipa::path(
    patch,
    path = "/payout-statements/{id}/confirm",
    tag = "payouts",
    params(("id" = PayoutStatementId, Path, description = "Payout statement ID")),
    responses(
        (status = 200, description = "Confirmed statement", body = PayoutStatementResponse),
        (status = 400, description = "Statement not yet executed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Already confirmed"),
    ),
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn confirm_payout_statement(
    State(state): State<AppState>,
    Path(id): Path<PayoutStatementId>,
    current_user: CurrentUser,
) -> Result<(StatusCode, Json<PayoutStatementResponse>)> {
    permissions::require_operations(&current_user, Resource::Payouts, Operation::Update)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Payouts::new(&mut pool_conn);

    let statement = repo
        .get_by_id((current_user.implementer_id, id))
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Payout statement".to_string(),
            id: id.to_string(),
        })?;

    if statement.executed_at.is_none() {
        return Err(Error::BadRequest {
            message: "Statement has not been executed by a settlement run yet".to_string(),
        });
    }
    if statement.confirmed_at.is_some() {
        return Err(Error::Conflict {
            message: "Statement has already been confirmed".to_string(),
        });
    }

    let statement = repo.confirm((current_user.implementer_id, id), Utc::now()).await?;

    Ok((StatusCode::OK, Json(PayoutStatementResponse::from(statement))))
}
