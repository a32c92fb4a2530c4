//! Error types for eventops
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, bad config, unknown ids)
//! - 3: Rejected (stale revision on write)
//! - 4: Operation failed (network, git, parse)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the eventops CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const REJECTED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for eventops operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Referee {ref_id} is already assigned as {position} for event {event_id}")]
    DuplicateAssignment {
        event_id: String,
        ref_id: String,
        position: String,
    },

    // Rejected writes (exit code 3)
    #[error("Revision conflict on {0}: the file changed since it was read")]
    RevisionConflict(String),

    // Operation failures (exit code 4)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::MissingCredentials(_)
            | Error::NotFound { .. }
            | Error::DuplicateAssignment { .. } => exit_codes::USER_ERROR,

            // Rejected writes
            Error::RevisionConflict(_) => exit_codes::REJECTED,

            // Operation failures
            Error::Http(_)
            | Error::Api { .. }
            | Error::Git(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::Csv(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::Decode(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::NotFound { kind, id } => Some(serde_json::json!({ "kind": kind, "id": id })),
            Error::DuplicateAssignment {
                event_id,
                ref_id,
                position,
            } => Some(serde_json::json!({
                "event_id": event_id,
                "ref_id": ref_id,
                "position": position,
            })),
            Error::RevisionConflict(path) => Some(serde_json::json!({ "path": path })),
            Error::Api { status, .. } => Some(serde_json::json!({ "status": status })),
            _ => None,
        }
    }

    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Result type alias for eventops operations
pub type Result<T> = std::result::Result<T, Error>;
