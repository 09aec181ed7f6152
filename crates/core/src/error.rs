//! Error types for catalogdb
//!
//! This module defines the error type shared by the storage, durability and
//! engine layers. We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! There is no "not found" variant. Lookups report absence through
//! `Option`/`bool` and the command layer turns that into an error.

use crate::limits::LimitError;
use std::io;
use thiserror::Error;

/// Result type alias for catalogdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for catalogdb
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Malformed input from the caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Document or catalog name limit violated
    #[error("Limit exceeded: {0}")]
    Limit(#[from] LimitError),

    /// Identifier already present where a fresh one was required
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persisted data could not be interpreted
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Create an invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }

    /// Create a corruption error
    pub fn corruption(msg: impl Into<String>) -> Self {
        Error::Corruption(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
