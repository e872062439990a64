//! Repository implementations for CRUD operations.

pub mod api_keys;
pub mod attendance;
pub mod fellows;
pub mod implementers;
pub mod payouts;
pub mod repository;
pub mod schools;
pub mod sessions;
pub mod students;
pub mod supervisors;
pub mod users;

pub use api_keys::ApiKeys;
pub use attendance::Attendance;
pub use fellows::Fellows;
pub use implementers::Implementers;
pub use payouts::Payouts;
pub use repository::Repository;
pub use schools::Schools;
pub use sessions::Sessions;
pub use students::{Cases, Students};
pub use supervisors::Supervisors;
pub use users::Users;
