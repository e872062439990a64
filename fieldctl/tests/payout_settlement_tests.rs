//! Settlement batch behavior: eligibility filtering, atomic counts,
//! idempotent re-runs, tenant isolation, and bank confirmation.

use axum_test::TestServer;
use chrono::Utc;
use fieldctl::api::models::payouts::{PayoutStatementResponse, SettlementRunResponse};
use fieldctl::api::models::users::Role;
use fieldctl::db::handlers::{Attendance, Payouts};
use fieldctl::db::models::attendance::AttendanceMarkDBRequest;
use fieldctl::test_utils::{
    create_test_app, create_test_fellow, create_test_implementer, create_test_pool, create_test_school, create_test_session,
    create_test_user,
};
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

fn bearer(secret: &str) -> (axum::http::HeaderName, axum::http::HeaderValue) {
    (
        axum::http::header::AUTHORIZATION,
        format!("Bearer {secret}").parse().expect("header value"),
    )
}

struct Setup {
    server: TestServer,
    pool: SqlitePool,
    implementer_id: Uuid,
    school_id: Uuid,
    fellow_id: Uuid,
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

impl Setup {
    /// Schedule a session for today, mark the fellow attended (creating one
    /// payout statement), and record that the session occurred.
    async fn eligible_attendance(&self) -> Uuid {
        let today = Utc::now().date_naive();
        let session = create_test_session(&self.pool, self.implementer_id, self.school_id, self.fellow_id, today).await;

        let (name, value) = bearer(&self.coordinator_key);
        let response = self
            .server
            .post(&format!("/api/v1/sessions/{}/attendance", session.id))
            .add_header(name, value)
            .json(&json!({
                "fellow_id": self.fellow_id,
                "status": "attended",
            }))
            .await;
        response.assert_status_ok();
        let marked: fieldctl::api::models::attendance::MarkAttendanceResponse = response.json();

        let (name, value) = bearer(&self.coordinator_key);
        self.server
            .patch(&format!("/api/v1/sessions/{}", session.id))
            .add_header(name, value)
            .json(&json!({ "occurred": true }))
            .await
            .assert_status_ok();

        marked.record.id
    }

    async fn run_settlement(&self) -> SettlementRunResponse {
        let (name, value) = bearer(&self.ops_key);
        let response = self.server.post("/api/v1/payouts/settlement-runs").add_header(name, value).await;
        response.assert_status_ok();
        response.json()
    }

    async fn list_statements(&self, query: &str) -> Vec<PayoutStatementResponse> {
        let (name, value) = bearer(&self.ops_key);
        let response = self
            .server
            .get(&format!("/api/v1/payout-statements{query}"))
            .add_header(name, value)
            .await;
        response.assert_status_ok();
        response.json()
    }
}

#[test_log::test(tokio::test)]
async fn test_settlement_executes_statement_and_marks_processed() {
    let setup = setup().await;
    let attendance_id = setup.eligible_attendance().await;

    let outcome = setup.run_settlement().await;
    assert_eq!(outcome.processed_count, 1);
    assert_eq!(outcome.payout_statements_count, 1);

    let executed = setup.list_statements("?executed=true").await;
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].attendance_id, attendance_id);
    assert!(executed[0].executed_at.is_some());
    assert!(executed[0].confirmed_at.is_none());

    // The attendance record now carries the settlement marker
    let (name, value) = bearer(&setup.coordinator_key);
    let response = setup
        .server
        .get(&format!("/api/v1/attendance/{attendance_id}"))
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let record: fieldctl::api::models::attendance::AttendanceResponse = response.json();
    assert!(record.processed_at.is_some());
}

#[test_log::test(tokio::test)]
async fn test_second_run_settles_nothing() {
    let setup = setup().await;
    setup.eligible_attendance().await;

    let first = setup.run_settlement().await;
    assert_eq!(first.processed_count, 1);

    let second = setup.run_settlement().await;
    assert_eq!(second.processed_count, 0);
    assert_eq!(second.payout_statements_count, 0);
}

#[test_log::test(tokio::test)]
async fn test_attendance_without_statements_is_skipped() {
    let setup = setup().await;
    let today = Utc::now().date_naive();
    let session = create_test_session(&setup.pool, setup.implementer_id, setup.school_id, setup.fellow_id, today).await;

    // Mark attended directly at the repository layer, bypassing statement
    // creation, and record the session as occurred.
    {
        let mut conn = setup.pool.acquire().await.unwrap();
        let mut attendance_repo = Attendance::new(&mut conn);
        let record = attendance_repo
            .get_or_create(setup.implementer_id, session.id, setup.fellow_id)
            .await
            .unwrap();
        attendance_repo
            .apply_mark(
                record.id,
                &AttendanceMarkDBRequest {
                    attended: Some(true),
                    marked_at: Utc::now(),
                    delayed_confirmed_at: None,
                },
            )
            .await
            .unwrap();
        sqlx::query("UPDATE sessions SET occurred = 1 WHERE id = ?")
            .bind(session.id)
            .execute(&mut *conn)
            .await
            .unwrap();
    }

    let outcome = setup.run_settlement().await;
    assert_eq!(outcome.processed_count, 0);
    assert_eq!(outcome.payout_statements_count, 0);
}

#[test_log::test(tokio::test)]
async fn test_dropped_out_fellow_is_skipped() {
    let setup = setup().await;
    setup.eligible_attendance().await;

    let (name, value) = bearer(&setup.coordinator_key);
    setup
        .server
        .patch(&format!("/api/v1/fellows/{}", setup.fellow_id))
        .add_header(name, value)
        .json(&json!({ "status": "dropped_out" }))
        .await
        .assert_status_ok();

    let outcome = setup.run_settlement().await;
    assert_eq!(outcome.processed_count, 0);

    // The statement stays unexecuted
    let unexecuted = setup.list_statements("?executed=false").await;
    assert_eq!(unexecuted.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_session_that_did_not_occur_is_skipped() {
    let setup = setup().await;
    let today = Utc::now().date_naive();
    let session = create_test_session(&setup.pool, setup.implementer_id, setup.school_id, setup.fellow_id, today).await;

    let (name, value) = bearer(&setup.coordinator_key);
    setup
        .server
        .post(&format!("/api/v1/sessions/{}/attendance", session.id))
        .add_header(name, value)
        .json(&json!({
            "fellow_id": setup.fellow_id,
            "status": "attended",
        }))
        .await
        .assert_status_ok();

    // occurred stays false
    let outcome = setup.run_settlement().await;
    assert_eq!(outcome.processed_count, 0);
}

#[test_log::test(tokio::test)]
async fn test_missed_attendance_is_skipped() {
    let setup = setup().await;
    let today = Utc::now().date_naive();
    let session = create_test_session(&setup.pool, setup.implementer_id, setup.school_id, setup.fellow_id, today).await;

    let (name, value) = bearer(&setup.coordinator_key);
    setup
        .server
        .post(&format!("/api/v1/sessions/{}/attendance", session.id))
        .add_header(name, value)
        .json(&json!({
            "fellow_id": setup.fellow_id,
            "status": "missed",
        }))
        .await
        .assert_status_ok();

    let (name, value) = bearer(&setup.coordinator_key);
    setup
        .server
        .patch(&format!("/api/v1/sessions/{}", session.id))
        .add_header(name, value)
        .json(&json!({ "occurred": true }))
        .await
        .assert_status_ok();

    let outcome = setup.run_settlement().await;
    assert_eq!(outcome.processed_count, 0);
}

#[test_log::test(tokio::test)]
async fn test_settlement_is_tenant_scoped() {
    let setup = setup().await;
    setup.eligible_attendance().await;

    // A second implementer with its own eligible attendance, created at the
    // repository layer so both live in the same database.
    let other = create_test_implementer(&setup.pool, "other-program").await;
    let other_school = create_test_school(&setup.pool, other.id, "Westside High").await;
    let other_fellow = create_test_fellow(&setup.pool, other.id, other_school.id, 1000).await;
    let today = Utc::now().date_naive();
    let other_session = create_test_session(&setup.pool, other.id, other_school.id, other_fellow.id, today).await;
    {
        let mut conn = setup.pool.acquire().await.unwrap();
        let mut attendance_repo = Attendance::new(&mut conn);
        let record = attendance_repo
            .get_or_create(other.id, other_session.id, other_fellow.id)
            .await
            .unwrap();
        attendance_repo
            .apply_mark(
                record.id,
                &AttendanceMarkDBRequest {
                    attended: Some(true),
                    marked_at: Utc::now(),
                    delayed_confirmed_at: None,
                },
            )
            .await
            .unwrap();
        let mut payouts_repo = Payouts::new(&mut conn);
        payouts_repo
            .create(&fieldctl::db::models::payouts::PayoutStatementCreateDBRequest {
                implementer_id: other.id,
                attendance_id: record.id,
                fellow_id: other_fellow.id,
                amount_cents: 1000,
            })
            .await
            .unwrap();
        sqlx::query("UPDATE sessions SET occurred = 1 WHERE id = ?")
            .bind(other_session.id)
            .execute(&mut *conn)
            .await
            .unwrap();
    }

    // Settling as the first implementer's operations manager touches only
    // the first implementer's records
    let outcome = setup.run_settlement().await;
    assert_eq!(outcome.processed_count, 1);
    assert_eq!(outcome.payout_statements_count, 1);

    // The other implementer's statement is still unexecuted
    let (_other_ops, other_ops_key) = create_test_user(&setup.pool, other.id, Role::OperationsManager, false).await;
    let (name, value) = bearer(&other_ops_key);
    let response = setup
        .server
        .get("/api/v1/payout-statements?executed=false")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let statements: Vec<PayoutStatementResponse> = response.json();
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].implementer_id, other.id);
}

#[test_log::test(tokio::test)]
async fn test_settlement_requires_operations_role() {
    let setup = setup().await;

    let (name, value) = bearer(&setup.coordinator_key);
    let response = setup.server.post("/api/v1/payouts/settlement-runs").add_header(name, value).await;
    response.assert_status_forbidden();

    let response = setup.server.post("/api/v1/payouts/settlement-runs").await;
    response.assert_status_unauthorized();
}

#[test_log::test(tokio::test)]
async fn test_confirm_statement_lifecycle() {
    let setup = setup().await;
    setup.eligible_attendance().await;

    // Confirming before execution is rejected
    let unexecuted = setup.list_statements("?executed=false").await;
    let statement_id = unexecuted[0].id;
    let (name, value) = bearer(&setup.ops_key);
    let response = setup
        .server
        .patch(&format!("/api/v1/payout-statements/{statement_id}/confirm"))
        .add_header(name, value)
        .await;
    response.assert_status_bad_request();

    setup.run_settlement().await;

    // Confirm the executed statement
    let (name, value) = bearer(&setup.ops_key);
    let response = setup
        .server
        .patch(&format!("/api/v1/payout-statements/{statement_id}/confirm"))
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let confirmed: PayoutStatementResponse = response.json();
    assert!(confirmed.confirmed_at.is_some());

    // A second confirmation is a conflict
    let (name, value) = bearer(&setup.ops_key);
    let response = setup
        .server
        .patch(&format!("/api/v1/payout-statements/{statement_id}/confirm"))
        .add_header(name, value)
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}
