//! Common error types for Stretto

use thiserror::Error;

use crate::validation::FieldError;

/// Common result type for Stretto operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the store, the document mirror and the handlers
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Note Store unreachable or operation failed
    #[error("Store error: {0}")]
    Store(String),

    /// Third-party document API call failed
    #[error("Remote API error: {0}")]
    RemoteApi(String),

    /// Payload failed schema validation
    #[error("Validation failed ({} field error(s))", .0.len())]
    Validation(Vec<FieldError>),

    /// Payload could not be interpreted at all
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique key already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document (de)serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for failures of the Note Store itself
    pub fn is_store_error(&self) -> bool {
        match self {
            #[cfg(feature = "sqlx")]
            Error::Database(_) => true,
            Error::Store(_) => true,
            _ => false,
        }
    }
}
