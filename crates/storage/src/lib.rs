//! Storage layer for catalogdb
//!
//! This crate implements the in-memory half of the database:
//! - Catalog: a record sequence kept sorted by `_id`, with a dirty flag
//! - CatalogStore: named catalogs with lookup, insert, update and delete
//!
//! Lookup and insertion are binary searches over the sorted sequence, so a
//! catalog of n records answers `find_by_id` in O(log n) comparisons.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod store;

pub use catalog::Catalog;
pub use store::{CatalogStore, InsertOutcome};
