//! Request/response models for the management API.

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

use serde::Deserialize;
use utoipa::IntoParams;

/// Standard pagination query parameters shared by list endpoints
#[derive(Debug, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Number of items to skip
    #[param(default = 0, minimum = 0)]
    pub skip: Option<i64>,

    /// Maximum number of items to return
    #[param(default = 100, minimum = 1, maximum = 1000)]
    pub limit: Option<i64>,
}

impl PaginationQuery {
    pub fn skip(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(100).clamp(1, 1000)
    }
}
