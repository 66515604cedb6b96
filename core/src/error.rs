//! Error types for listing generation.

use thiserror::Error;

/// Result type alias for listing operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur while walking a tree or rendering a listing.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Template file could not be read.
    #[error("failed to read template: {0}")]
    Template(String),

    /// Override file could not be read.
    #[error("failed to read override file: {0}")]
    OverrideRead(String),

    /// Override file held something other than a file list.
    #[error("invalid override file: {0}")]
    OverrideParse(String),

    /// README was found but could not be read.
    #[error("failed to read readme: {0}")]
    Readme(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
