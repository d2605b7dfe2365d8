//! Unified error types for clipbase.
//!
//! Each save step has its own error kind so the caller can tell a rejected
//! credential exchange apart from a rejected row write. Remote failures carry
//! an optional detail block (the raw response plus request context) that the
//! CLI surfaces on demand.

use tokio_rusqlite::rusqlite;

/// Unified error types for the save pipeline and the inbox cache.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid configuration (credentials, destination base id).
    #[error("CONFIG_ERROR: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Malformed local capture (empty url/title, bad or undersized screenshot).
    #[error("VALIDATION_ERROR: {0}")]
    Validation(String),

    /// Credential exchange rejected by the remote.
    #[error("AUTH_ERROR: {message}")]
    Auth { message: String, detail: Option<String> },

    /// Binary asset upload failed.
    #[error("UPLOAD_ERROR: {message}")]
    Upload { message: String, detail: Option<String> },

    /// Destination tables or fields could not be discovered.
    #[error("SCHEMA_ERROR: {message}")]
    Schema { message: String, detail: Option<String> },

    /// Row creation rejected by the remote.
    #[error("WRITE_ERROR: {message}")]
    Write { message: String, detail: Option<String> },

    /// Request exceeded the configured timeout.
    #[error("TIMEOUT: {0}")]
    Timeout(String),

    /// Transport-level failure (DNS, TLS, connection reset).
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Inbox database operation failed.
    #[error("INBOX_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Inbox migration failed to apply.
    #[error("INBOX_ERROR: migration failed: {0}")]
    MigrationFailed(String),
}

impl Error {
    /// Diagnostic detail block for remote failures, if one was captured.
    ///
    /// Contains the remote code/message, the raw response body, and the
    /// request context that produced it.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::Auth { detail, .. }
            | Error::Upload { detail, .. }
            | Error::Schema { detail, .. }
            | Error::Write { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
