//! Error types for Mailroom.

use thiserror::Error;

/// Common error type for Mailroom.
#[derive(Error, Debug)]
pub enum MailroomError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] crate::template::TemplateError),

    /// Outbound delivery could not be set up.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for MailroomError {
    fn from(e: sqlx::Error) -> Self {
        MailroomError::Database(e.to_string())
    }
}

/// Result type alias for Mailroom operations.
pub type Result<T> = std::result::Result<T, MailroomError>;
