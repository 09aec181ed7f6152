//! Error types for command execution.
//!
//! All errors from command execution are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Serializable**: Can be converted to/from JSON
//! - **Transport-ready**: [`Error::status_code`] gives the HTTP status

use serde::{Deserialize, Serialize};

/// Command execution errors.
///
/// | Category | Variants | Status |
/// |----------|----------|--------|
/// | Not Found | `RecordNotFound`, `CatalogNotFound` | 404 |
/// | Validation | `InvalidInput`, `LimitExceeded` | 400 |
/// | Routing | `MethodNotImplemented` | 501 |
/// | System | `Conflict`, `Io`, `Serialization`, `Internal` | 500 |
///
/// # Example
///
/// ```ignore
/// use catalogdb_executor::{Command, Error, Executor};
///
/// match executor.execute(cmd) {
///     Ok(output) => { /* handle success */ }
///     Err(Error::RecordNotFound { id, .. }) => {
///         println!("Record '{}' not found", id);
///     }
///     Err(e) => {
///         println!("Error: {}", e);
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Not Found ====================
    /// No record with this `_id` in the catalog
    #[error("record not found: {catalog}/{id}")]
    RecordNotFound {
        /// Catalog name
        catalog: String,
        /// Record `_id`
        id: String,
    },

    /// Catalog does not exist
    #[error("catalog not found: {catalog}")]
    CatalogNotFound {
        /// Catalog name
        catalog: String,
    },

    // ==================== Validation Errors ====================
    /// Malformed request or document
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong
        reason: String,
    },

    /// Document or catalog name limit violated
    #[error("limit exceeded: {reason}")]
    LimitExceeded {
        /// Which limit
        reason: String,
    },

    // ==================== Routing Errors ====================
    /// Verb with no mapping
    #[error("method not implemented: {method}")]
    MethodNotImplemented {
        /// Request verb
        method: String,
    },

    // ==================== System Errors ====================
    /// Identifier collision
    #[error("conflict: {reason}")]
    Conflict {
        /// Details
        reason: String,
    },

    /// I/O or storage error
    #[error("I/O error: {reason}")]
    Io {
        /// Details
        reason: String,
    },

    /// Serialization error
    #[error("serialization error: {reason}")]
    Serialization {
        /// Details
        reason: String,
    },

    /// Internal error (bug or corrupted data)
    #[error("internal error: {reason}")]
    Internal {
        /// Details
        reason: String,
    },
}

impl Error {
    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::RecordNotFound { .. } | Error::CatalogNotFound { .. } => 404,
            Error::InvalidInput { .. } | Error::LimitExceeded { .. } => 400,
            Error::MethodNotImplemented { .. } => 501,
            Error::Conflict { .. }
            | Error::Io { .. }
            | Error::Serialization { .. }
            | Error::Internal { .. } => 500,
        }
    }

    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }
}
