//! Error types for the listing server.

use thiserror::Error;

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServeError>;

/// Errors that can occur while starting or running the server.
#[derive(Error, Debug)]
pub enum ServeError {
    /// Serving root is missing or not a directory.
    #[error("cannot serve {0}")]
    Root(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
