//! Error types for phonebase
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::path::{PathParseError, StorePath};
use std::io;
use thiserror::Error;

/// Result type alias for phonebase operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the phonebase document store
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (file operations, network, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Store path failed to parse or validate
    #[error("Invalid path: {0}")]
    InvalidPath(#[from] PathParseError),

    /// Nothing stored at the given path
    #[error("Not found: {0}")]
    NotFound(StorePath),

    /// A path segment addresses into a non-mapping value
    #[error("Type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        /// The path being traversed
        path: StorePath,
        /// Expected value type
        expected: &'static str,
        /// Value type actually found
        found: &'static str,
    },

    /// Invalid operation or state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Cloud registry request failed with a non-success status
    #[error("Cloud registry error (status {status}): {body}")]
    Cloud {
        /// HTTP status code returned by the registry
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// Cloud registry was unreachable
    #[error("Cloud registry unreachable: {0}")]
    CloudUnreachable(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
