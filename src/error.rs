//! Error types for todos
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown filter/sort, bad config)
//! - 3: Validation failed (task form rejected)
//! - 4: Operation failed (I/O, serialization, lock contention)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the todos CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const VALIDATION_FAILED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Main error type for todos operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Validation (exit code 3)
    #[error("Task rejected: {}", format_fields(.0))]
    Validation(Vec<FieldError>),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

fn format_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|field| format!("{} {}", field.field, field.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_) | Error::InvalidArgument(_) => exit_codes::USER_ERROR,

            Error::Validation(_) => exit_codes::VALIDATION_FAILED,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured payload for JSON error output, when the variant carries one.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Validation(fields) => Some(serde_json::json!({ "fields": fields })),
            Error::InvalidConfig(message) => Some(serde_json::json!({ "message": message })),
            Error::LockFailed(path) => {
                Some(serde_json::json!({ "path": path.to_string_lossy() }))
            }
            _ => None,
        }
    }
}

/// Result type alias for todos operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
