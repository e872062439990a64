//! API request handlers, one module per resource.

pub mod api_keys;
pub mod attendance;
pub mod auth;
pub mod fellows;
pub mod implementers;
pub mod payouts;
pub mod schools;
pub mod sessions;
pub mod students;
pub mod supervisors;
pub mod users;
