//! Attendance marking through the API, exercising the cutoff rule:
//! free marking before the cutoff, delayed-payment confirmation after it,
//! and the lock on present records once the cutoff has passed.

use axum_test::TestServer;
use chrono::{Duration, Utc};
use fieldctl::api::models::attendance::{AttendanceResponse, AttendanceStatus, MarkAttendanceResponse, MarkOutcome};
use fieldctl::api::models::payouts::{PayoutStatementResponse, SettlementRunResponse};
use fieldctl::api::models::users::Role;
use fieldctl::test_utils::{
    create_test_app, create_test_fellow, create_test_implementer, create_test_pool, create_test_school, create_test_session,
    create_test_user,
};
use serde_json::json;

fn bearer(secret: &str) -> (axum::http::HeaderName, axum::http::HeaderValue) {
    (
        axum::http::header::AUTHORIZATION,
        format!("Bearer {secret}").parse().expect("header value"),
    )
}

struct Setup {
    server: TestServer,
    pool: sqlx::SqlitePool,
    implementer_id: uuid::Uuid,
    school_id: uuid::Uuid,
    fellow_id: uuid::Uuid,
    coordinator_key: String,
    ops_key: String,
}

async fn setup() -> Setup {
    let pool = create_test_pool().await;
    let implementer = create_test_implementer(&pool, "bright-futures").await;
    let school = create_test_school(&pool, implementer.id, "Eastside Primary").await;
    let fellow = create_test_fellow(&pool, implementer.id, school.id, 2500).await;
    let (_coordinator, coordinator_key) = create_test_user(&pool, implementer.id, Role::FieldCoordinator, false).await;
    let (_ops, ops_key) = create_test_user(&pool, implementer.id, Role::OperationsManager, false).await;
    let server = TestServer::new(create_test_app(pool.clone())).expect("test server");

    Setup {
        server,
        pool,
        implementer_id: implementer.id,
        school_id: school.id,
        fellow_id: fellow.id,
        coordinator_key,
        ops_key,
    }
}

async fn mark(setup: &Setup, session_id: uuid::Uuid, status: &str, confirmed: bool) -> MarkAttendanceResponse {
    let (name, value) = bearer(&setup.coordinator_key);
    let response = setup
        .server
        .post(&format!("/api/v1/sessions/{session_id}/attendance"))
        .add_header(name, value)
        .json(&json!({
            "fellow_id": setup.fellow_id,
            "status": status,
            "delayed_payment_confirmed": confirmed,
        }))
        .await;

    response.assert_status_ok();
    response.json::<MarkAttendanceResponse>()
}

#[test_log::test(tokio::test)]
async fn test_mark_before_cutoff_applies_without_confirmation() {
    let setup = setup().await;
    let today = Utc::now().date_naive();
    let session = create_test_session(&setup.pool, setup.implementer_id, setup.school_id, setup.fellow_id, today).await;

    let result = mark(&setup, session.id, "attended", false).await;

    assert_eq!(result.outcome, MarkOutcome::Applied);
    assert_eq!(result.record.status, AttendanceStatus::Attended);
    assert!(result.record.marked_at.is_some());
    assert!(result.record.delayed_confirmed_at.is_none());
}

#[test_log::test(tokio::test)]
async fn test_mark_creates_payout_statement_at_fellow_rate() {
    let setup = setup().await;
    let today = Utc::now().date_naive();
    let session = create_test_session(&setup.pool, setup.implementer_id, setup.school_id, setup.fellow_id, today).await;

    mark(&setup, session.id, "attended", false).await;

    let (name, value) = bearer(&setup.ops_key);
    let response = setup
        .server
        .get("/api/v1/payout-statements?executed=false")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let statements: Vec<PayoutStatementResponse> = response.json();
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].amount_cents, 2500);
    assert_eq!(statements[0].fellow_id, setup.fellow_id);

    // Re-marking attended does not duplicate the statement
    mark(&setup, session.id, "attended", false).await;
    let (name, value) = bearer(&setup.ops_key);
    let response = setup
        .server
        .get("/api/v1/payout-statements?executed=false")
        .add_header(name, value)
        .await;
    let statements: Vec<PayoutStatementResponse> = response.json();
    assert_eq!(statements.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_unmarking_before_cutoff_drops_provisional_statement() {
    let setup = setup().await;
    let today = Utc::now().date_naive();
    let session = create_test_session(&setup.pool, setup.implementer_id, setup.school_id, setup.fellow_id, today).await;

    mark(&setup, session.id, "attended", false).await;
    let result = mark(&setup, session.id, "missed", false).await;
    assert_eq!(result.outcome, MarkOutcome::Applied);
    assert_eq!(result.record.status, AttendanceStatus::Missed);

    let (name, value) = bearer(&setup.ops_key);
    let response = setup.server.get("/api/v1/payout-statements").add_header(name, value).await;
    let statements: Vec<PayoutStatementResponse> = response.json();
    assert!(statements.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_mark_after_cutoff_requires_confirmation() {
    let setup = setup().await;
    let stale_date = Utc::now().date_naive() - Duration::days(10);
    let session = create_test_session(&setup.pool, setup.implementer_id, setup.school_id, setup.fellow_id, stale_date).await;

    let result = mark(&setup, session.id, "attended", false).await;
    assert_eq!(result.outcome, MarkOutcome::ConfirmationRequired);
    // The stored status must be unchanged
    assert_eq!(result.record.status, AttendanceStatus::Unmarked);

    let (name, value) = bearer(&setup.coordinator_key);
    let response = setup
        .server
        .get(&format!("/api/v1/attendance/{}", result.record.id))
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let record: AttendanceResponse = response.json();
    assert_eq!(record.status, AttendanceStatus::Unmarked);
    assert!(record.marked_at.is_none());
}

#[test_log::test(tokio::test)]
async fn test_mark_after_cutoff_with_confirmation_applies_delayed() {
    let setup = setup().await;
    let stale_date = Utc::now().date_naive() - Duration::days(10);
    let session = create_test_session(&setup.pool, setup.implementer_id, setup.school_id, setup.fellow_id, stale_date).await;

    let result = mark(&setup, session.id, "attended", true).await;

    assert_eq!(result.outcome, MarkOutcome::Applied);
    assert_eq!(result.record.status, AttendanceStatus::Attended);
    // The delayed-payment acknowledgment is recorded
    assert!(result.record.delayed_confirmed_at.is_some());
}

#[test_log::test(tokio::test)]
async fn test_present_record_locked_after_cutoff() {
    let setup = setup().await;
    let stale_date = Utc::now().date_naive() - Duration::days(10);
    let session = create_test_session(&setup.pool, setup.implementer_id, setup.school_id, setup.fellow_id, stale_date).await;

    // Get the record to attended via the delayed path
    mark(&setup, session.id, "attended", true).await;

    // Clicking again leaves the status at present, confirmation or not
    let result = mark(&setup, session.id, "missed", false).await;
    assert_eq!(result.outcome, MarkOutcome::Locked);
    assert_eq!(result.record.status, AttendanceStatus::Attended);

    let result = mark(&setup, session.id, "missed", true).await;
    assert_eq!(result.outcome, MarkOutcome::Locked);
    assert_eq!(result.record.status, AttendanceStatus::Attended);

    let result = mark(&setup, session.id, "unmarked", true).await;
    assert_eq!(result.outcome, MarkOutcome::Locked);
    assert_eq!(result.record.status, AttendanceStatus::Attended);
}

#[test_log::test(tokio::test)]
async fn test_settled_record_is_immutable() {
    let setup = setup().await;
    let today = Utc::now().date_naive();
    let session = create_test_session(&setup.pool, setup.implementer_id, setup.school_id, setup.fellow_id, today).await;

    mark(&setup, session.id, "attended", false).await;

    // Record that the session occurred, then settle
    let (name, value) = bearer(&setup.coordinator_key);
    setup
        .server
        .patch(&format!("/api/v1/sessions/{}", session.id))
        .add_header(name, value)
        .json(&json!({ "occurred": true }))
        .await
        .assert_status_ok();

    let (name, value) = bearer(&setup.ops_key);
    let response = setup
        .server
        .post("/api/v1/payouts/settlement-runs")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let outcome: SettlementRunResponse = response.json();
    assert_eq!(outcome.processed_count, 1);

    // Any further change is a conflict
    let (name, value) = bearer(&setup.coordinator_key);
    let response = setup
        .server
        .post(&format!("/api/v1/sessions/{}/attendance", session.id))
        .add_header(name, value)
        .json(&json!({
            "fellow_id": setup.fellow_id,
            "status": "missed",
            "delayed_payment_confirmed": true,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[test_log::test(tokio::test)]
async fn test_viewer_cannot_mark_attendance() {
    let setup = setup().await;
    let today = Utc::now().date_naive();
    let session = create_test_session(&setup.pool, setup.implementer_id, setup.school_id, setup.fellow_id, today).await;

    let (_viewer, viewer_key) = create_test_user(&setup.pool, setup.implementer_id, Role::Viewer, false).await;
    let (name, value) = bearer(&viewer_key);
    let response = setup
        .server
        .post(&format!("/api/v1/sessions/{}/attendance", session.id))
        .add_header(name, value)
        .json(&json!({
            "fellow_id": setup.fellow_id,
            "status": "attended",
        }))
        .await;

    response.assert_status_forbidden();
}

#[test_log::test(tokio::test)]
async fn test_mark_unknown_session_is_not_found() {
    let setup = setup().await;

    let (name, value) = bearer(&setup.coordinator_key);
    let response = setup
        .server
        .post(&format!("/api/v1/sessions/{}/attendance", uuid::Uuid::new_v4()))
        .add_header(name, value)
        .json(&json!({
            "fellow_id": setup.fellow_id,
            "status": "attended",
        }))
        .await;

    response.assert_status_not_found();
}

#[test_log::test(tokio::test)]
async fn test_mark_requires_authentication() {
    let setup = setup().await;
    let today = Utc::now().date_naive();
    let session = create_test_session(&setup.pool, setup.implementer_id, setup.school_id, setup.fellow_id, today).await;

    let response = setup
        .server
        .post(&format!("/api/v1/sessions/{}/attendance", session.id))
        .json(&json!({
            "fellow_id": setup.fellow_id,
            "status": "attended",
        }))
        .await;

    response.assert_status_unauthorized();
}
