//! Error types for osce-core.

use thiserror::Error;

/// Result type alias using osce-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for OSCE Voice operations
#[derive(Error, Debug)]
pub enum Error {
    // Session lifecycle errors
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session not active: {0}")]
    SessionNotActive(String),

    #[error("Session already active: {0}")]
    SessionAlreadyActive(String),

    // Case store errors
    #[error("Case not found: {0}")]
    CaseNotFound(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
