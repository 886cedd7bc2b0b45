//! Error types module
//!
//! `AppError` is the error taxonomy of the submission pipeline. Each variant maps to
//! one step of the pipeline so callers can tell whether any durable side effect may
//! already have happened:
//!
//! - `Validation` / `BadRequest`: nothing was fetched or written.
//! - `Fetch`: the remote image could not be retrieved; nothing was written.
//! - `Storage`, `Persistence`, `Publish`: a collaborator failed after earlier steps
//!   may already have committed.
//!
//! The `From<sqlx::Error>` conversion is gated behind the `sqlx` feature.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected errors such as validation failures
    Debug,
    /// Failures of third-party input (remote image hosts)
    Warn,
    /// Failures of our own collaborators
    Error,
}

/// Metadata for error responses - lets errors self-describe how they are presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "FETCH_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether internal details must never reach the client
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Client message for a missing or empty required field.
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields";
/// Client message for any failure to download the remote image.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to download image";

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON serialization error: {}", err))
    }
}

impl AppError {
    /// Variant name, used as a structured logging field
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Validation",
            AppError::BadRequest(_) => "BadRequest",
            AppError::Fetch(_) => "Fetch",
            AppError::Storage(_) => "Storage",
            AppError::Persistence(_) => "Persistence",
            AppError::Publish(_) => "Publish",
            AppError::NotFound(_) => "NotFound",
            AppError::Internal(_) => "Internal",
        }
    }

    /// Whether a durable side effect may have been committed before this error
    pub fn after_side_effects(&self) -> bool {
        matches!(self, AppError::Persistence(_) | AppError::Publish(_))
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::Fetch(_) => 400,
            AppError::NotFound(_) => 404,
            AppError::Storage(_)
            | AppError::Persistence(_)
            | AppError::Publish(_)
            | AppError::Internal(_) => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Fetch(_) => "FETCH_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Persistence(_) => "PERSISTENCE_ERROR",
            AppError::Publish(_) => "PUBLISH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::BadRequest(_) => "Invalid request body".to_string(),
            AppError::Fetch(_) => FETCH_FAILED_MESSAGE.to_string(),
            AppError::Storage(_) => "Failed to store image".to_string(),
            AppError::Persistence(_) => "Failed to save submission".to_string(),
            AppError::Publish(_) => "Failed to publish submission".to_string(),
            AppError::NotFound(_) => "Not Found".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    fn is_sensitive(&self) -> bool {
        matches!(
            self,
            AppError::Storage(_)
                | AppError::Persistence(_)
                | AppError::Publish(_)
                | AppError::Internal(_)
        )
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::NotFound(_) => {
                LogLevel::Debug
            }
            AppError::Fetch(_) => LogLevel::Warn,
            AppError::Storage(_)
            | AppError::Persistence(_)
            | AppError::Publish(_)
            | AppError::Internal(_) => LogLevel::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_map_to_bad_request() {
        assert_eq!(
            AppError::Validation(MISSING_FIELDS_MESSAGE.to_string()).http_status_code(),
            400
        );
        assert_eq!(AppError::Fetch("404".to_string()).http_status_code(), 400);
        assert_eq!(AppError::BadRequest("eof".to_string()).http_status_code(), 400);
    }

    #[test]
    fn test_fetch_error_hides_upstream_detail() {
        let err = AppError::Fetch("upstream returned 404 Not Found".to_string());
        assert_eq!(err.client_message(), "Failed to download image");
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_collaborator_errors_are_sensitive_server_errors() {
        for err in [
            AppError::Storage("bucket gone".to_string()),
            AppError::Persistence("connection reset".to_string()),
            AppError::Publish("channel closed".to_string()),
        ] {
            assert_eq!(err.http_status_code(), 500);
            assert!(err.is_sensitive());
            assert!(!err.client_message().contains("gone"));
            assert_eq!(err.log_level(), LogLevel::Error);
        }
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err = AppError::Validation("Invalid image URL".to_string());
        assert_eq!(err.client_message(), "Invalid image URL");
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(!err.after_side_effects());
    }
}
