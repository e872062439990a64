//! Database record structures matching table schemas.
//!
//! Each entity has a `*CreateDBRequest` (what the repository needs to insert
//! a row), usually a `*UpdateDBRequest` with optional fields, and a
//! `*DBResponse` (the row as returned to the API layer).

pub mod api_keys;
pub mod attendance;
pub mod fellows;
pub mod implementers;
pub mod payouts;
pub mod schools;
pub mod sessions;
pub mod students;
pub mod supervisors;
pub mod users;
