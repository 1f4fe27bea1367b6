//! Error taxonomy for planner operations.

use thiserror::Error;

/// Errors surfaced by the store and the storage collaborators.
///
/// Validation errors refuse the write before any mutation happens. Storage
/// errors never reach mutation callers: the store catches and logs them,
/// keeping the in-memory collection authoritative for the session.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("task title must not be empty")]
    EmptyTitle,

    #[error("duration must be a positive number of minutes")]
    InvalidDuration,

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
