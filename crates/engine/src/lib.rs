//! Database engine for catalogdb
//!
//! This crate ties the lower layers together:
//! - Database: service object owning the store, persistence and collaborators
//! - DatabaseBuilder: pluggable identifier generator, evaluator and limits
//! - CatalogConfig: `catalogdb.toml` in the data directory
//! - Registry: one instance per data directory within a process
//!
//! The engine is the only component that knows about:
//! - The directory lock
//! - When to save (explicit, on every write, or on close)
//! - Which catalog names are usable as file names

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod database;

pub use database::{CatalogConfig, Database, DatabaseBuilder, CONFIG_FILE_NAME};
