//! # fieldctl: Control Layer for Education-Program Field Operations
//!
//! `fieldctl` is the server side of a multi-tenant operations dashboard for
//! school-based intervention programs. It tracks partner schools, fellows
//! (field staff), supervisors, students and their clinical cases, scheduled
//! sessions, per-session attendance, and the payout workflow that turns
//! attended sessions into payable statements.
//!
//! ## Overview
//!
//! Implementer organizations run intervention programs across many schools.
//! Their operations teams need a single place to keep rosters current, record
//! which sessions actually happened and who showed up, and settle the
//! resulting payouts to field staff. This crate provides the RESTful
//! management API behind that dashboard, with role-based access control and
//! hard tenant isolation: every record belongs to one implementer, and every
//! query is scoped by the authenticated caller's implementer.
//!
//! Two business rules carry most of the weight:
//!
//! - **Attendance cutoff** ([`policy::cutoff`]): a session's attendance may
//!   be marked freely until the configured cutoff time on the day after the
//!   session. Later changes need an explicit delayed-payment acknowledgment,
//!   and a record already marked present is locked entirely.
//! - **Payout settlement** ([`db::handlers::payouts`]): a single-transaction
//!   batch that marks eligible attendance as processed and its payout
//!   statements as executed, all-or-nothing and idempotent across re-runs.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses SQLite (via SQLx) for persistence. Requests pass
//! through authentication (session cookie or bearer API key), reach a handler
//! that performs role checks, and touch the database through repository
//! interfaces. The interactive API reference is served at `/docs`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use fieldctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = fieldctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     fieldctl::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod policy;
pub mod telemetry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::{
    api::models::users::Role,
    auth::password,
    db::handlers::{Implementers, Repository, Users},
    db::models::{implementers::ImplementerCreateDBRequest, users::UserCreateDBRequest},
    openapi::ApiDoc,
    types::abbrev_uuid,
};
use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, patch, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{AttendanceId, FellowId, ImplementerId, PayoutStatementId, SchoolId, SessionId, UserId};

/// Application state shared across all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Get the fieldctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: the implementer organization is created when missing and an
/// existing account with the given email is left untouched. Typically called
/// during application startup so there is always an admin available.
pub async fn create_initial_admin_user(
    email: &str,
    password: Option<&str>,
    implementer_name: &str,
    db: &SqlitePool,
) -> anyhow::Result<UserId> {
    let mut tx = db.begin().await?;

    let mut implementers_repo = Implementers::new(&mut tx);
    let implementer = match implementers_repo.get_by_name(implementer_name).await? {
        Some(existing) => existing,
        None => {
            implementers_repo
                .create(&ImplementerCreateDBRequest {
                    name: implementer_name.to_string(),
                })
                .await?
        }
    };

    let mut users_repo = Users::new(&mut tx);
    if let Some(existing) = users_repo.get_user_by_email(email).await? {
        tx.commit().await?;
        return Ok(existing.id);
    }

    let password_hash = password.map(password::hash_string).transpose()?;
    let user = users_repo
        .create(&UserCreateDBRequest {
            implementer_id: implementer.id,
            email: email.to_string(),
            display_name: Some("Administrator".to_string()),
            role: Role::OperationsManager,
            is_admin: true,
            password_hash,
        })
        .await?;

    tx.commit().await?;
    Ok(user.id)
}

/// Build the CORS layer from config. An empty origin list means permissive
/// (development) mode.
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    if config.cors_allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = config
        .cors_allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any))
}

/// Assemble the application router.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        // Authentication
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .route("/authentication/me", get(api::handlers::auth::me))
        // Implementer management (admin)
        .route("/implementers", get(api::handlers::implementers::list_implementers))
        .route("/implementers", post(api::handlers::implementers::create_implementer))
        .route("/implementers/{id}", get(api::handlers::implementers::get_implementer))
        .route("/implementers/{id}", patch(api::handlers::implementers::update_implementer))
        .route("/implementers/{id}", delete(api::handlers::implementers::delete_implementer))
        // User management (admin)
        .route("/users", get(api::handlers::users::list_users))
        .route("/users", post(api::handlers::users::create_user))
        .route("/users/{id}", get(api::handlers::users::get_user))
        .route("/users/{id}", patch(api::handlers::users::update_user))
        .route("/users/{id}", delete(api::handlers::users::delete_user))
        // API keys for the current user
        .route("/users/current/api-keys", get(api::handlers::api_keys::list_api_keys))
        .route("/users/current/api-keys", post(api::handlers::api_keys::create_api_key))
        .route("/users/current/api-keys/{id}", delete(api::handlers::api_keys::delete_api_key))
        // Schools
        .route("/schools", get(api::handlers::schools::list_schools))
        .route("/schools", post(api::handlers::schools::create_school))
        .route("/schools/{id}", get(api::handlers::schools::get_school))
        .route("/schools/{id}", patch(api::handlers::schools::update_school))
        .route("/schools/{id}", delete(api::handlers::schools::delete_school))
        // Fellows
        .route("/fellows", get(api::handlers::fellows::list_fellows))
        .route("/fellows", post(api::handlers::fellows::create_fellow))
        .route("/fellows/{id}", get(api::handlers::fellows::get_fellow))
        .route("/fellows/{id}", patch(api::handlers::fellows::update_fellow))
        .route("/fellows/{id}", delete(api::handlers::fellows::delete_fellow))
        // Supervisors
        .route("/supervisors", get(api::handlers::supervisors::list_supervisors))
        .route("/supervisors", post(api::handlers::supervisors::create_supervisor))
        .route("/supervisors/{id}", get(api::handlers::supervisors::get_supervisor))
        .route("/supervisors/{id}", patch(api::handlers::supervisors::update_supervisor))
        .route("/supervisors/{id}", delete(api::handlers::supervisors::delete_supervisor))
        // Students and clinical cases
        .route("/students", get(api::handlers::students::list_students))
        .route("/students", post(api::handlers::students::create_student))
        .route("/students/{id}", get(api::handlers::students::get_student))
        .route("/students/{id}", patch(api::handlers::students::update_student))
        .route("/students/{id}", delete(api::handlers::students::delete_student))
        .route("/students/{student_id}/cases", get(api::handlers::students::list_student_cases))
        .route("/students/{student_id}/cases", post(api::handlers::students::create_student_case))
        .route("/cases/{id}", patch(api::handlers::students::update_case))
        // Sessions and attendance
        .route("/sessions", get(api::handlers::sessions::list_sessions))
        .route("/sessions", post(api::handlers::sessions::create_session))
        .route("/sessions/{id}", get(api::handlers::sessions::get_session))
        .route("/sessions/{id}", patch(api::handlers::sessions::update_session))
        .route("/sessions/{id}", delete(api::handlers::sessions::delete_session))
        .route("/sessions/{id}/attendance", post(api::handlers::attendance::mark_attendance))
        .route("/attendance", get(api::handlers::attendance::list_attendance))
        .route("/attendance/{id}", get(api::handlers::attendance::get_attendance))
        // Payouts
        .route("/payouts/settlement-runs", post(api::handlers::payouts::trigger_settlement_run))
        .route("/payout-statements", get(api::handlers::payouts::list_payout_statements))
        .route("/payout-statements/{id}", get(api::handlers::payouts::get_payout_statement))
        .route(
            "/payout-statements/{id}/confirm",
            patch(api::handlers::payouts::confirm_payout_statement),
        );

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api/v1", api_routes.with_state(state.clone()))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] opens the database, runs migrations,
///    and seeds the initial admin user
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts
///    handling requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests
///    drain and the pool is closed
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting field operations control layer with configuration: {:#?}", config);

        let pool = db::connect(&config.database).await?;
        migrator().run(&pool).await?;

        if let (Some(email), Some(admin_password)) = (config.admin.email.as_deref(), config.admin.password.as_deref()) {
            let user_id = create_initial_admin_user(email, Some(admin_password), &config.admin.implementer, &pool).await?;
            info!("Ensured initial admin user {} ({})", email, abbrev_uuid(&user_id));
        }

        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Field operations control layer listening on http://{}, docs at http://localhost:{}/docs",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
