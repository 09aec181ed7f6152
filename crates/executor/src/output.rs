//! Output enum for command execution results.
//!
//! Every command produces exactly one output variant, documented on the
//! [`Command`](crate::Command) variants.

use catalogdb_query::QueryOutcome;
use serde::{Deserialize, Serialize};

use crate::Value;

/// Successful command execution results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// No return value
    Unit,

    /// Boolean result
    Bool(bool),

    /// Reply to `Ping`
    Pong {
        /// Crate version
        version: String,
    },

    /// Whole catalog, `None` if it does not exist
    Records(Option<Vec<Value>>),

    /// Single record lookup
    MaybeRecord(Option<Value>),

    /// Filter matches or a structured query error
    Query(QueryOutcome),

    /// Identifier assigned by an insert
    Inserted {
        /// New `_id`
        id: String,
    },

    /// Catalog names
    Catalogs(Vec<String>),

    /// Catalogs written by a save
    Saved {
        /// Flushed catalog names
        catalogs: Vec<String>,
    },
}
