//! OpenAPI document aggregation.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api::models::{
    api_keys::{ApiKeyCreate, ApiKeyResponse},
    attendance::{AttendanceResponse, AttendanceStatus, MarkAttendanceRequest, MarkAttendanceResponse, MarkOutcome},
    auth::{AuthResponse, AuthSuccessResponse, LoginRequest},
    fellows::{FellowCreate, FellowResponse, FellowUpdate},
    implementers::{ImplementerCreate, ImplementerResponse, ImplementerUpdate},
    payouts::{PayoutStatementResponse, SettlementRunResponse},
    schools::{SchoolCreate, SchoolResponse, SchoolUpdate},
    sessions::{SessionCreate, SessionResponse, SessionUpdate},
    students::{CaseCreate, CaseResponse, CaseUpdate, StudentCreate, StudentResponse, StudentUpdate},
    supervisors::{SupervisorCreate, SupervisorResponse, SupervisorUpdate},
    users::{Role, UserCreate, UserResponse, UserUpdate},
};
use crate::db::models::{fellows::FellowStatus, students::CaseStatus};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("fieldctl_session"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "fieldctl",
        description = "Control layer for education-program field operations: schools, fellows, session attendance, and payout settlement."
    ),
    servers((url = "/api/v1")),
    paths(
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::logout,
        crate::api::handlers::auth::me,
        crate::api::handlers::implementers::list_implementers,
        crate::api::handlers::implementers::create_implementer,
        crate::api::handlers::implementers::get_implementer,
        crate::api::handlers::implementers::update_implementer,
        crate::api::handlers::implementers::delete_implementer,
        crate::api::handlers::users::list_users,
        crate::api::handlers::users::create_user,
        crate::api::handlers::users::get_user,
        crate::api::handlers::users::update_user,
        crate::api::handlers::users::delete_user,
        crate::api::handlers::api_keys::list_api_keys,
        crate::api::handlers::api_keys::create_api_key,
        crate::api::handlers::api_keys::delete_api_key,
        crate::api::handlers::schools::list_schools,
        crate::api::handlers::schools::create_school,
        crate::api::handlers::schools::get_school,
        crate::api::handlers::schools::update_school,
        crate::api::handlers::schools::delete_school,
        crate::api::handlers::fellows::list_fellows,
        crate::api::handlers::fellows::create_fellow,
        crate::api::handlers::fellows::get_fellow,
        crate::api::handlers::fellows::update_fellow,
        crate::api::handlers::fellows::delete_fellow,
        crate::api::handlers::supervisors::list_supervisors,
        crate::api::handlers::supervisors::create_supervisor,
        crate::api::handlers::supervisors::get_supervisor,
        crate::api::handlers::supervisors::update_supervisor,
        crate::api::handlers::supervisors::delete_supervisor,
        crate::api::handlers::students::list_students,
        crate::api::handlers::students::create_student,
        crate::api::handlers::students::get_student,
        crate::api::handlers::students::update_student,
        crate::api::handlers::students::delete_student,
        crate::api::handlers::students::list_student_cases,
        crate::api::handlers::students::create_student_case,
        crate::api::handlers::students::update_case,
        crate::api::handlers::sessions::list_sessions,
        crate::api::handlers::sessions::create_session,
        crate::api::handlers::sessions::get_session,
        crate::api::handlers::sessions::update_session,
        crate::api::handlers::sessions::delete_session,
        crate::api::handlers::attendance::list_attendance,
        crate::api::handlers::attendance::get_attendance,
        crate::api::handlers::attendance::mark_attendance,
        crate::api::handlers::payouts::trigger_settlement_run,
        crate::api::handlers::payouts::list_payout_statements,
        crate::api::handlers::payouts::get_payout_statement,
        crate::api::handlers::payouts::confirm_payout_statement,
    ),
    components(schemas(
        LoginRequest,
        AuthResponse,
        AuthSuccessResponse,
        Role,
        UserCreate,
        UserUpdate,
        UserResponse,
        ImplementerCreate,
        ImplementerUpdate,
        ImplementerResponse,
        ApiKeyCreate,
        ApiKeyResponse,
        SchoolCreate,
        SchoolUpdate,
        SchoolResponse,
        FellowStatus,
        FellowCreate,
        FellowUpdate,
        FellowResponse,
        SupervisorCreate,
        SupervisorUpdate,
        SupervisorResponse,
        StudentCreate,
        StudentUpdate,
        StudentResponse,
        CaseStatus,
        CaseCreate,
        CaseUpdate,
        CaseResponse,
        SessionCreate,
        SessionUpdate,
        SessionResponse,
        AttendanceStatus,
        MarkOutcome,
        MarkAttendanceRequest,
        AttendanceResponse,
        MarkAttendanceResponse,
        PayoutStatementResponse,
        SettlementRunResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "authentication", description = "Login, logout, and session introspection"),
        (name = "implementers", description = "Tenant organizations (admin)"),
        (name = "users", description = "Dashboard accounts (admin)"),
        (name = "api-keys", description = "Per-user bearer keys"),
        (name = "schools", description = "Partner schools"),
        (name = "fellows", description = "Field staff delivering sessions"),
        (name = "supervisors", description = "Staff overseeing fellows"),
        (name = "students", description = "Students and clinical cases"),
        (name = "sessions", description = "Scheduled intervention sessions"),
        (name = "attendance", description = "Per-session attendance marking"),
        (name = "payouts", description = "Payout statements and settlement runs"),
    )
)]
pub struct ApiDoc;
