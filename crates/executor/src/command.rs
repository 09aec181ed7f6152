//! Command enum defining all catalogdb operations.
//!
//! Commands are the "instruction set" of catalogdb. Every operation a front
//! end can perform is a variant of this enum.
//!
//! Commands are:
//! - **Self-contained**: All parameters needed for execution are in the variant
//! - **Serializable**: Can be converted to/from JSON for cross-language use
//! - **Pure data**: No closures or executable code

use serde::{Deserialize, Serialize};

use crate::Value;

/// A command is a self-contained, serializable operation.
///
/// | Category | Commands |
/// |----------|----------|
/// | Database | `Ping`, `ListCatalogs`, `Save` |
/// | Read | `GetCatalog`, `FindRecord`, `QueryCatalog` |
/// | Write | `InsertRecord`, `UpdateRecord`, `DeleteRecord`, `DeleteCatalog` |
///
/// # Example
///
/// ```ignore
/// use catalogdb_executor::{Command, Value};
///
/// let cmd = Command::QueryCatalog {
///     catalog: "widgets".into(),
///     filter: r#".[name eq "a"]"#.into(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    // ==================== Database ====================
    /// Liveness check.
    /// Returns: `Output::Pong`
    Ping,

    /// List catalog names in order.
    /// Returns: `Output::Catalogs`
    ListCatalogs,

    /// Flush dirty catalogs to disk.
    /// Returns: `Output::Saved`
    Save,

    // ==================== Read ====================
    /// All records of a catalog.
    /// Returns: `Output::Records` (`None` if the catalog does not exist)
    GetCatalog {
        /// Catalog name
        catalog: String,
    },

    /// One record by identifier.
    /// Returns: `Output::MaybeRecord`
    FindRecord {
        /// Catalog name
        catalog: String,
        /// Record `_id`
        id: String,
    },

    /// Records matching a filter expression.
    /// Returns: `Output::Query`
    QueryCatalog {
        /// Catalog name
        catalog: String,
        /// Filter, e.g. `.[name eq "a"]`
        filter: String,
    },

    // ==================== Write ====================
    /// Insert a document under a fresh identifier.
    /// Any `_id` in the document is replaced.
    /// Returns: `Output::Inserted`
    InsertRecord {
        /// Catalog name, created on first insert
        catalog: String,
        /// JSON object
        document: Value,
    },

    /// Merge a document's fields over the stored record with the same `_id`.
    /// Returns: `Output::Unit`
    UpdateRecord {
        /// Catalog name
        catalog: String,
        /// JSON object carrying `_id`
        document: Value,
    },

    /// Delete one record.
    /// Returns: `Output::Unit`
    DeleteRecord {
        /// Catalog name
        catalog: String,
        /// Record `_id`
        id: String,
    },

    /// Delete a whole catalog and its file.
    /// Returns: `Output::Bool` (true if the catalog existed)
    DeleteCatalog {
        /// Catalog name
        catalog: String,
    },
}

impl Command {
    /// Variant name, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping => "Ping",
            Command::ListCatalogs => "ListCatalogs",
            Command::Save => "Save",
            Command::GetCatalog { .. } => "GetCatalog",
            Command::FindRecord { .. } => "FindRecord",
            Command::QueryCatalog { .. } => "QueryCatalog",
            Command::InsertRecord { .. } => "InsertRecord",
            Command::UpdateRecord { .. } => "UpdateRecord",
            Command::DeleteRecord { .. } => "DeleteRecord",
            Command::DeleteCatalog { .. } => "DeleteCatalog",
        }
    }

    /// Check if executing this command can change the database
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Command::InsertRecord { .. }
                | Command::UpdateRecord { .. }
                | Command::DeleteRecord { .. }
                | Command::DeleteCatalog { .. }
                | Command::Save
        )
    }
}
