//! Error conversion from internal error types.

use crate::Error;
use catalogdb_core::Error as CoreError;

/// Convert an engine error to an executor Error.
impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(reason) => Error::InvalidInput { reason },
            CoreError::Limit(e) => Error::LimitExceeded {
                reason: e.to_string(),
            },
            CoreError::Conflict(reason) => Error::Conflict { reason },
            CoreError::Io(e) => Error::Io {
                reason: e.to_string(),
            },
            CoreError::Storage(reason) => Error::Io { reason },
            CoreError::Serialization(reason) => Error::Serialization { reason },
            CoreError::Corruption(reason) => Error::Internal {
                reason: format!("data corruption: {}", reason),
            },
        }
    }
}
