//! Authentication and authorization system.
//!
//! # Authentication Methods
//!
//! The system supports two authentication methods, tried in order:
//!
//! ## 1. API Key Authentication
//!
//! Token-based authentication for programmatic access:
//! - API keys created per-user via `/api/v1/users/current/api-keys`
//! - Passed in `Authorization: Bearer <key>` header
//! - No expiration (manually revoked when needed)
//!
//! ## 2. Session Authentication
//!
//! Browser-based authentication using secure HTTP-only cookies:
//! - Users log in via `/authentication/login` with email/password
//! - A signed JWT carries the account identity and implementer scope
//! - Tokens expire after the configured `auth.session.jwt_expiry`
//!
//! # Authorization
//!
//! Every authenticated caller carries an implementer (tenant) scope and a
//! [`Role`](crate::api::models::users::Role). Handlers gate mutating
//! operations through the helpers in [`permissions`]; the `is_admin` flag
//! short-circuits every role check and additionally unlocks implementer and
//! user management.
//!
//! # Modules
//!
//! - [`current_user`]: Extractor for getting the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`permissions`]: Role checks
//! - [`session`]: JWT session token creation and verification

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
