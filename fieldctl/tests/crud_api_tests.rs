//! Router-level coverage for authentication, role gating, tenant isolation,
//! and the CRUD surface.

use axum_test::TestServer;
use chrono::Utc;
use fieldctl::api::models::api_keys::ApiKeyResponse;
use fieldctl::api::models::schools::SchoolResponse;
use fieldctl::api::models::sessions::SessionResponse;
use fieldctl::api::models::students::{CaseResponse, StudentResponse};
use fieldctl::api::models::users::{Role, UserResponse};
use fieldctl::test_utils::{
    create_test_app, create_test_fellow, create_test_implementer, create_test_pool, create_test_school, create_test_user,
    create_test_user_with_password,
};
use serde_json::json;

fn bearer(secret: &str) -> (axum::http::HeaderName, axum::http::HeaderValue) {
    (
        axum::http::header::AUTHORIZATION,
        format!("Bearer {secret}").parse().expect("header value"),
    )
}

#[test_log::test(tokio::test)]
async fn test_healthz() {
    let pool = create_test_pool().await;
    let server = TestServer::new(create_test_app(pool)).expect("test server");

    let response = server.get("/healthz").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[test_log::test(tokio::test)]
async fn test_management_endpoints_require_authentication() {
    let pool = create_test_pool().await;
    let server = TestServer::new(create_test_app(pool)).expect("test server");

    for path in ["/api/v1/schools", "/api/v1/fellows", "/api/v1/sessions", "/api/v1/payout-statements"] {
        let response = server.get(path).await;
        response.assert_status_unauthorized();
    }

    let response = server.post("/api/v1/payouts/settlement-runs").await;
    response.assert_status_unauthorized();
}

#[test_log::test(tokio::test)]
async fn test_login_sets_session_cookie() {
    let pool = create_test_pool().await;
    let implementer = create_test_implementer(&pool, "bright-futures").await;
    create_test_user_with_password(&pool, implementer.id, Role::Viewer, "viewer@example.com", "a-long-password").await;
    let server = TestServer::new(create_test_app(pool)).expect("test server");

    let response = server
        .post("/api/v1/authentication/login")
        .json(&json!({ "email": "viewer@example.com", "password": "a-long-password" }))
        .await;
    response.assert_status_ok();

    let set_cookie = response
        .headers()
        .get(axum::http::header::SET_COOKIE)
        .expect("session cookie set")
        .to_str()
        .expect("cookie header is ascii")
        .to_string();
    assert!(set_cookie.starts_with("fieldctl_session="));

    // The cookie authenticates follow-up requests
    let cookie_pair = set_cookie.split(';').next().expect("cookie pair").to_string();
    let response = server
        .get("/api/v1/authentication/me")
        .add_header(axum::http::header::COOKIE, cookie_pair.parse::<axum::http::HeaderValue>().unwrap())
        .await;
    response.assert_status_ok();
    let me: UserResponse = response.json();
    assert_eq!(me.email, "viewer@example.com");
}

#[test_log::test(tokio::test)]
async fn test_login_with_wrong_password_rejected() {
    let pool = create_test_pool().await;
    let implementer = create_test_implementer(&pool, "bright-futures").await;
    create_test_user_with_password(&pool, implementer.id, Role::Viewer, "viewer@example.com", "a-long-password").await;
    let server = TestServer::new(create_test_app(pool)).expect("test server");

    let response = server
        .post("/api/v1/authentication/login")
        .json(&json!({ "email": "viewer@example.com", "password": "wrong-password" }))
        .await;
    response.assert_status_unauthorized();

    let response = server
        .post("/api/v1/authentication/login")
        .json(&json!({ "email": "nobody@example.com", "password": "a-long-password" }))
        .await;
    response.assert_status_unauthorized();
}

#[test_log::test(tokio::test)]
async fn test_school_crud_roundtrip() {
    let pool = create_test_pool().await;
    let implementer = create_test_implementer(&pool, "bright-futures").await;
    let (_ops, ops_key) = create_test_user(&pool, implementer.id, Role::OperationsManager, false).await;
    let server = TestServer::new(create_test_app(pool)).expect("test server");

    // Create
    let (name, value) = bearer(&ops_key);
    let response = server
        .post("/api/v1/schools")
        .add_header(name, value)
        .json(&json!({ "name": "Eastside Primary", "district": "East" }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let school: SchoolResponse = response.json();
    assert_eq!(school.name, "Eastside Primary");
    assert_eq!(school.implementer_id, implementer.id);

    // Duplicate name within the implementer conflicts
    let (name, value) = bearer(&ops_key);
    let response = server
        .post("/api/v1/schools")
        .add_header(name, value)
        .json(&json!({ "name": "Eastside Primary" }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);

    // Read
    let (name, value) = bearer(&ops_key);
    let response = server.get(&format!("/api/v1/schools/{}", school.id)).add_header(name, value).await;
    response.assert_status_ok();

    // Update
    let (name, value) = bearer(&ops_key);
    let response = server
        .patch(&format!("/api/v1/schools/{}", school.id))
        .add_header(name, value)
        .json(&json!({ "district": "North-East" }))
        .await;
    response.assert_status_ok();
    let updated: SchoolResponse = response.json();
    assert_eq!(updated.district.as_deref(), Some("North-East"));
    assert_eq!(updated.name, "Eastside Primary");

    // List
    let (name, value) = bearer(&ops_key);
    let response = server.get("/api/v1/schools").add_header(name, value).await;
    response.assert_status_ok();
    let schools: Vec<SchoolResponse> = response.json();
    assert_eq!(schools.len(), 1);

    // Delete
    let (name, value) = bearer(&ops_key);
    let response = server.delete(&format!("/api/v1/schools/{}", school.id)).add_header(name, value).await;
    response.assert_status(axum::http::StatusCode::NO_CONTENT);

    let (name, value) = bearer(&ops_key);
    let response = server.get(&format!("/api/v1/schools/{}", school.id)).add_header(name, value).await;
    response.assert_status_not_found();
}

#[test_log::test(tokio::test)]
async fn test_school_creation_is_operations_only() {
    let pool = create_test_pool().await;
    let implementer = create_test_implementer(&pool, "bright-futures").await;
    let (_coordinator, coordinator_key) = create_test_user(&pool, implementer.id, Role::FieldCoordinator, false).await;
    let (_viewer, viewer_key) = create_test_user(&pool, implementer.id, Role::Viewer, false).await;
    let server = TestServer::new(create_test_app(pool)).expect("test server");

    for key in [&coordinator_key, &viewer_key] {
        let (name, value) = bearer(key);
        let response = server
            .post("/api/v1/schools")
            .add_header(name, value)
            .json(&json!({ "name": "Eastside Primary" }))
            .await;
        response.assert_status_forbidden();
    }
}

#[test_log::test(tokio::test)]
async fn test_cross_tenant_reads_are_not_found() {
    let pool = create_test_pool().await;
    let implementer_a = create_test_implementer(&pool, "program-a").await;
    let implementer_b = create_test_implementer(&pool, "program-b").await;
    let school = create_test_school(&pool, implementer_a.id, "Eastside Primary").await;
    let (_user_b, key_b) = create_test_user(&pool, implementer_b.id, Role::OperationsManager, false).await;
    let server = TestServer::new(create_test_app(pool)).expect("test server");

    let (name, value) = bearer(&key_b);
    let response = server.get(&format!("/api/v1/schools/{}", school.id)).add_header(name, value).await;
    response.assert_status_not_found();

    // And lists do not leak across implementers
    let (name, value) = bearer(&key_b);
    let response = server.get("/api/v1/schools").add_header(name, value).await;
    response.assert_status_ok();
    let schools: Vec<SchoolResponse> = response.json();
    assert!(schools.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_fellow_negative_rate_rejected() {
    let pool = create_test_pool().await;
    let implementer = create_test_implementer(&pool, "bright-futures").await;
    let school = create_test_school(&pool, implementer.id, "Eastside Primary").await;
    let (_coordinator, coordinator_key) = create_test_user(&pool, implementer.id, Role::FieldCoordinator, false).await;
    let server = TestServer::new(create_test_app(pool)).expect("test server");

    let (name, value) = bearer(&coordinator_key);
    let response = server
        .post("/api/v1/fellows")
        .add_header(name, value)
        .json(&json!({
            "school_id": school.id,
            "name": "New Fellow",
            "email": "fellow@example.com",
            "session_rate_cents": -100,
        }))
        .await;
    response.assert_status_bad_request();
}

#[test_log::test(tokio::test)]
async fn test_api_key_lifecycle() {
    let pool = create_test_pool().await;
    let implementer = create_test_implementer(&pool, "bright-futures").await;
    let (_user, initial_key) = create_test_user(&pool, implementer.id, Role::Viewer, false).await;
    let server = TestServer::new(create_test_app(pool)).expect("test server");

    // Create a second key; the secret is only returned on creation
    let (name, value) = bearer(&initial_key);
    let response = server
        .post("/api/v1/users/current/api-keys")
        .add_header(name, value)
        .json(&json!({ "name": "ci" }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let created: ApiKeyResponse = response.json();
    let new_secret = created.secret.clone().expect("secret returned on creation");

    // The fresh key authenticates
    let (name, value) = bearer(&new_secret);
    let response = server.get("/api/v1/authentication/me").add_header(name, value).await;
    response.assert_status_ok();

    // Listing omits secrets
    let (name, value) = bearer(&initial_key);
    let response = server.get("/api/v1/users/current/api-keys").add_header(name, value).await;
    response.assert_status_ok();
    let keys: Vec<ApiKeyResponse> = response.json();
    assert_eq!(keys.len(), 2);
    assert!(keys.iter().all(|k| k.secret.is_none()));

    // Revoke the new key; it stops authenticating
    let (name, value) = bearer(&initial_key);
    let response = server
        .delete(&format!("/api/v1/users/current/api-keys/{}", created.id))
        .add_header(name, value)
        .await;
    response.assert_status(axum::http::StatusCode::NO_CONTENT);

    let (name, value) = bearer(&new_secret);
    let response = server.get("/api/v1/authentication/me").add_header(name, value).await;
    response.assert_status_unauthorized();
}

#[test_log::test(tokio::test)]
async fn test_user_management_is_admin_only() {
    let pool = create_test_pool().await;
    let implementer = create_test_implementer(&pool, "bright-futures").await;
    let (_ops, ops_key) = create_test_user(&pool, implementer.id, Role::OperationsManager, false).await;
    let (_admin, admin_key) = create_test_user(&pool, implementer.id, Role::OperationsManager, true).await;
    let server = TestServer::new(create_test_app(pool)).expect("test server");

    // Even an operations manager is rejected without the admin flag
    let (name, value) = bearer(&ops_key);
    let response = server.get("/api/v1/users").add_header(name, value).await;
    response.assert_status_forbidden();

    // Admin can create an account
    let (name, value) = bearer(&admin_key);
    let response = server
        .post("/api/v1/users")
        .add_header(name, value)
        .json(&json!({
            "implementer_id": implementer.id,
            "email": "new-coordinator@example.com",
            "role": "field_coordinator",
            "password": "a-long-password",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let created: UserResponse = response.json();
    assert_eq!(created.role, Role::FieldCoordinator);

    // Short passwords are rejected
    let (name, value) = bearer(&admin_key);
    let response = server
        .post("/api/v1/users")
        .add_header(name, value)
        .json(&json!({
            "implementer_id": implementer.id,
            "email": "short@example.com",
            "role": "viewer",
            "password": "short",
        }))
        .await;
    response.assert_status_bad_request();

    // Role changes apply
    let (name, value) = bearer(&admin_key);
    let response = server
        .patch(&format!("/api/v1/users/{}", created.id))
        .add_header(name, value)
        .json(&json!({ "role": "operations_manager" }))
        .await;
    response.assert_status_ok();
    let updated: UserResponse = response.json();
    assert_eq!(updated.role, Role::OperationsManager);
}

#[test_log::test(tokio::test)]
async fn test_student_case_flow() {
    let pool = create_test_pool().await;
    let implementer = create_test_implementer(&pool, "bright-futures").await;
    let school = create_test_school(&pool, implementer.id, "Eastside Primary").await;
    let fellow = create_test_fellow(&pool, implementer.id, school.id, 2500).await;
    let (_coordinator, coordinator_key) = create_test_user(&pool, implementer.id, Role::FieldCoordinator, false).await;
    let server = TestServer::new(create_test_app(pool)).expect("test server");

    // Enroll a student
    let (name, value) = bearer(&coordinator_key);
    let response = server
        .post("/api/v1/students")
        .add_header(name, value)
        .json(&json!({ "school_id": school.id, "name": "Sam", "grade": "5" }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let student: StudentResponse = response.json();

    // Open a case handled by the fellow
    let (name, value) = bearer(&coordinator_key);
    let response = server
        .post(&format!("/api/v1/students/{}/cases", student.id))
        .add_header(name, value)
        .json(&json!({ "fellow_id": fellow.id, "notes": "initial screening" }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let case: CaseResponse = response.json();
    assert!(case.closed_at.is_none());

    // Close it; closed_at is stamped
    let (name, value) = bearer(&coordinator_key);
    let response = server
        .patch(&format!("/api/v1/cases/{}", case.id))
        .add_header(name, value)
        .json(&json!({ "status": "closed" }))
        .await;
    response.assert_status_ok();
    let closed: CaseResponse = response.json();
    assert!(closed.closed_at.is_some());

    // It shows up in the student's case list
    let (name, value) = bearer(&coordinator_key);
    let response = server
        .get(&format!("/api/v1/students/{}/cases", student.id))
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let cases: Vec<CaseResponse> = response.json();
    assert_eq!(cases.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_session_scheduling_and_occurred_flag() {
    let pool = create_test_pool().await;
    let implementer = create_test_implementer(&pool, "bright-futures").await;
    let school = create_test_school(&pool, implementer.id, "Eastside Primary").await;
    let fellow = create_test_fellow(&pool, implementer.id, school.id, 2500).await;
    let (_coordinator, coordinator_key) = create_test_user(&pool, implementer.id, Role::FieldCoordinator, false).await;
    let server = TestServer::new(create_test_app(pool)).expect("test server");

    let today = Utc::now().date_naive();
    let (name, value) = bearer(&coordinator_key);
    let response = server
        .post("/api/v1/sessions")
        .add_header(name, value)
        .json(&json!({
            "school_id": school.id,
            "fellow_id": fellow.id,
            "session_date": today,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let session: SessionResponse = response.json();
    assert!(!session.occurred);
    assert_eq!(session.session_date, today);

    let (name, value) = bearer(&coordinator_key);
    let response = server
        .patch(&format!("/api/v1/sessions/{}", session.id))
        .add_header(name, value)
        .json(&json!({ "occurred": true }))
        .await;
    response.assert_status_ok();
    let updated: SessionResponse = response.json();
    assert!(updated.occurred);
}
