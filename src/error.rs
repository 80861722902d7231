//! Error types for each component boundary

use thiserror::Error;

/// Token could not be turned into claims.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed session token: {0}")]
    MalformedToken(String),
}

/// Failures of the persistent session slot.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a failed credential exchange.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Please enter your username or email.")]
    EmptyIdentifier,

    #[error("Please enter your password.")]
    EmptyPassword,

    /// Any non-2xx response. 401 and 5xx are deliberately not told apart.
    #[error("Invalid login. Please try again.")]
    InvalidCredentials,

    #[error("Could not reach the login endpoint: {0}")]
    Transport(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Outcome of a failed profile query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Could not reach the query endpoint: {0}")]
    Transport(String),

    /// The response carried `errors` instead of `data`.
    #[error("Query rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),

    #[error("Unexpected query response: {0}")]
    InvalidResponse(String),
}
