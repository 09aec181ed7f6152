//! catalogdb - embeddable schema-less document store
//!
//! Named catalogs of JSON records, each addressed by a unique `_id`, kept
//! sorted in memory, queried with a small filter language and persisted as
//! one JSON file per catalog.
//!
//! # Quick Start
//!
//! ```ignore
//! use catalogdb::Catalogdb;
//! use serde_json::json;
//!
//! let db = Catalogdb::ephemeral();
//! let id = db.insert("widgets", json!({"name": "a"}))?;
//! let hits = db.query("widgets", r#".[name eq "a"]"#)?;
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`Executor`], which provides a command-based
//! API. The [`Catalogdb`] struct provides a typed high-level interface and
//! [`rest`] maps HTTP verbs onto commands.
//!
//! Storage, durability, query and engine internals are not re-exported.

// Re-export the public API from catalogdb-executor
pub use catalogdb_executor::*;
