//! # catalogdb executor
//!
//! The public API for catalogdb, an embeddable schema-less document store.
//!
//! This is the only crate users need to import. It provides:
//! - [`Catalogdb`] - typed interface over catalogs of JSON records
//! - [`Command`]/[`Output`] - low-level command interface
//! - [`rest`] - verb/path/query mapping for HTTP front ends
//!
//! ## Quick Start
//!
//! ```text
//! use catalogdb_executor::Catalogdb;
//! use serde_json::json;
//!
//! let db = Catalogdb::open("/path/to/data")?;
//! let id = db.insert("widgets", json!({"name": "a", "size": 3}))?;
//! let record = db.find_record("widgets", &id)?;
//! let hits = db.query("widgets", r#".[size > 2]"#)?;
//! db.save()?;
//! ```

#![warn(missing_docs)]

mod api;
mod command;
mod convert;
mod error;
mod executor;
mod output;
pub mod rest;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use api::Catalogdb;
pub use command::Command;
pub use error::Error;
pub use executor::Executor;
pub use output::Output;

pub use catalogdb_core::Value;
pub use catalogdb_engine::{CatalogConfig, Database};
pub use catalogdb_query::{QueryFailure, QueryOutcome};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
