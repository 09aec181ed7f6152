//! Core types for catalogdb
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: tagged JSON value for record fields
//! - Record / RecordId: schema-less documents and their identifiers
//! - compare_ids: the identifier comparator every sorted catalog relies on
//! - IdGenerator: pluggable source of fresh identifiers
//! - Limits: document and catalog-name limits
//! - Error: error type shared by the lower layers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod id;
pub mod limits;
pub mod record;
pub mod value;

pub use error::{Error, Result};
pub use id::{IdGenerator, SequentialIdGenerator, UuidV4Generator, UuidV7Generator};
pub use limits::{LimitError, Limits};
pub use record::{compare_ids, Record, RecordId, ID_FIELD};
pub use value::{Map, Value};
