//! Size limits for documents and catalog names
//!
//! These limits are enforced by the engine on insert and update, and on
//! catalog creation. Violations surface as [`Error::Limit`](crate::Error::Limit).

use crate::record::Record;
use crate::value::Value;
use thiserror::Error;

/// Size limits for documents and catalog names
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum catalog name length in bytes (default: 246, so that
    /// `<name>.json.tmp` fits in a 255-byte file name)
    pub max_catalog_name_bytes: usize,

    /// Maximum encoded document size in bytes (default: 16MB)
    pub max_document_bytes: usize,

    /// Maximum array length (default: 1M elements)
    pub max_array_len: usize,

    /// Maximum nesting depth (default: 100)
    pub max_nesting_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_catalog_name_bytes: 246,
            max_document_bytes: 16 * 1024 * 1024, // 16MB
            max_array_len: 1_000_000,
            max_nesting_depth: 100,
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        Limits {
            max_catalog_name_bytes: 16,
            max_document_bytes: 1000,
            max_array_len: 10,
            max_nesting_depth: 4,
        }
    }

    /// Validate a catalog name
    ///
    /// Catalog names double as file names, so they must be non-empty, must
    /// not start with `.`, and must not contain path separators or NUL.
    pub fn validate_catalog_name(&self, name: &str) -> Result<(), LimitError> {
        if name.is_empty() {
            return Err(LimitError::InvalidCatalogName {
                name: name.to_string(),
                reason: "empty",
            });
        }
        if name.len() > self.max_catalog_name_bytes {
            return Err(LimitError::CatalogNameTooLong {
                actual: name.len(),
                max: self.max_catalog_name_bytes,
            });
        }
        if name.starts_with('.') {
            return Err(LimitError::InvalidCatalogName {
                name: name.to_string(),
                reason: "leading dot",
            });
        }
        if name.contains(['/', '\\', '\0']) {
            return Err(LimitError::InvalidCatalogName {
                name: name.to_string(),
                reason: "path separator or NUL",
            });
        }
        Ok(())
    }

    /// Validate a record against the document limits
    pub fn validate_record(&self, record: &Record) -> Result<(), LimitError> {
        for value in record.fields().values() {
            self.validate_value_impl(value, 1)?;
        }
        let size = record.clone().into_value().encoded_len();
        if size > self.max_document_bytes {
            return Err(LimitError::DocumentTooLarge {
                actual: size,
                max: self.max_document_bytes,
            });
        }
        Ok(())
    }

    fn validate_value_impl(&self, value: &Value, depth: usize) -> Result<(), LimitError> {
        if depth > self.max_nesting_depth {
            return Err(LimitError::NestingTooDeep {
                actual: depth,
                max: self.max_nesting_depth,
            });
        }

        match value {
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_) => {
                Ok(())
            }
            Value::Array(arr) => {
                if arr.len() > self.max_array_len {
                    return Err(LimitError::ArrayTooLarge {
                        actual: arr.len(),
                        max: self.max_array_len,
                    });
                }
                for v in arr {
                    self.validate_value_impl(v, depth + 1)?;
                }
                Ok(())
            }
            Value::Object(obj) => {
                for v in obj.values() {
                    self.validate_value_impl(v, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

/// Limit validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitError {
    /// Catalog name is not usable
    #[error("invalid catalog name {name:?}: {reason}")]
    InvalidCatalogName {
        /// Offending name
        name: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Catalog name exceeds maximum length
    #[error("catalog name too long: {actual} bytes exceeds maximum {max}")]
    CatalogNameTooLong {
        /// Actual length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },

    /// Document exceeds maximum encoded size
    #[error("document size {actual} exceeds maximum of {max} bytes")]
    DocumentTooLarge {
        /// Actual encoded size
        actual: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// Document nesting exceeds maximum depth
    #[error("document nesting depth {actual} exceeds maximum of {max} levels")]
    NestingTooDeep {
        /// Actual nesting depth
        actual: usize,
        /// Maximum allowed depth
        max: usize,
    },

    /// Array exceeds maximum length
    #[error("array size {actual} exceeds maximum of {max} elements")]
    ArrayTooLarge {
        /// Actual array length
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },
}
