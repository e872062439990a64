//! Common type definitions and permission system types.
//!
//! All entity IDs are UUIDs wrapped in type aliases. The permission types
//! ([`Resource`], [`Operation`], [`Permission`]) describe what a caller was
//! required to hold when an authorization check fails.

use std::fmt;
use uuid::Uuid;

// Type aliases for IDs
pub type ImplementerId = Uuid;
pub type UserId = Uuid;
pub type ApiKeyId = Uuid;
pub type SchoolId = Uuid;
pub type FellowId = Uuid;
pub type SupervisorId = Uuid;
pub type StudentId = Uuid;
pub type CaseId = Uuid;
pub type SessionId = Uuid;
pub type AttendanceId = Uuid;
pub type PayoutStatementId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

// Operations that can be performed on resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Execute,
}

// Resources that can be operated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Implementers,
    Users,
    ApiKeys,
    Schools,
    Fellows,
    Supervisors,
    Students,
    Cases,
    Sessions,
    Attendance,
    Payouts,
}

// Permission types for authorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    /// Simple permission: (Resource, Operation)
    Allow(Resource, Operation),
    /// Platform administrator access
    Admin,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Read => write!(f, "read"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
            Operation::Execute => write!(f, "execute"),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Implementers => "implementers",
            Resource::Users => "users",
            Resource::ApiKeys => "api keys",
            Resource::Schools => "schools",
            Resource::Fellows => "fellows",
            Resource::Supervisors => "supervisors",
            Resource::Students => "students",
            Resource::Cases => "cases",
            Resource::Sessions => "sessions",
            Resource::Attendance => "attendance",
            Resource::Payouts => "payouts",
        };
        write!(f, "{name}")
    }
}
