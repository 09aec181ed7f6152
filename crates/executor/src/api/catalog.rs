//! Catalog operations.

use catalogdb_query::QueryOutcome;

use super::{unexpected, Catalogdb};
use crate::{Command, Output, Result, Value};

impl Catalogdb {
    /// All records of a catalog in `_id` order, `None` if it does not exist.
    pub fn get_catalog(&self, catalog: &str) -> Result<Option<Vec<Value>>> {
        match self.executor.execute(Command::GetCatalog {
            catalog: catalog.to_string(),
        })? {
            Output::Records(records) => Ok(records),
            _ => Err(unexpected("GetCatalog")),
        }
    }

    /// Record with the given `_id`.
    pub fn find_record(&self, catalog: &str, id: &str) -> Result<Option<Value>> {
        match self.executor.execute(Command::FindRecord {
            catalog: catalog.to_string(),
            id: id.to_string(),
        })? {
            Output::MaybeRecord(record) => Ok(record),
            _ => Err(unexpected("FindRecord")),
        }
    }

    /// Records matching a filter.
    ///
    /// A malformed filter is not an `Err`: it comes back as
    /// [`QueryOutcome::Error`].
    ///
    /// ```ignore
    /// let hits = db.query("widgets", r#"{.size > 2 and .name neq "b"}"#)?;
    /// ```
    pub fn query(&self, catalog: &str, filter: &str) -> Result<QueryOutcome> {
        match self.executor.execute(Command::QueryCatalog {
            catalog: catalog.to_string(),
            filter: filter.to_string(),
        })? {
            Output::Query(outcome) => Ok(outcome),
            _ => Err(unexpected("QueryCatalog")),
        }
    }

    /// Insert a JSON object; returns its new `_id`.
    ///
    /// Accepts anything convertible to [`Value`], including
    /// `serde_json::Value`.
    pub fn insert(&self, catalog: &str, document: impl Into<Value>) -> Result<String> {
        match self.executor.execute(Command::InsertRecord {
            catalog: catalog.to_string(),
            document: document.into(),
        })? {
            Output::Inserted { id } => Ok(id),
            _ => Err(unexpected("InsertRecord")),
        }
    }

    /// Merge a document carrying `_id` over the stored record.
    pub fn update(&self, catalog: &str, document: impl Into<Value>) -> Result<()> {
        match self.executor.execute(Command::UpdateRecord {
            catalog: catalog.to_string(),
            document: document.into(),
        })? {
            Output::Unit => Ok(()),
            _ => Err(unexpected("UpdateRecord")),
        }
    }

    /// Delete one record.
    pub fn delete_record(&self, catalog: &str, id: &str) -> Result<()> {
        match self.executor.execute(Command::DeleteRecord {
            catalog: catalog.to_string(),
            id: id.to_string(),
        })? {
            Output::Unit => Ok(()),
            _ => Err(unexpected("DeleteRecord")),
        }
    }

    /// Delete a catalog; returns whether it existed.
    pub fn delete_catalog(&self, catalog: &str) -> Result<bool> {
        match self.executor.execute(Command::DeleteCatalog {
            catalog: catalog.to_string(),
        })? {
            Output::Bool(existed) => Ok(existed),
            _ => Err(unexpected("DeleteCatalog")),
        }
    }

    /// Catalog names in order.
    pub fn list_catalogs(&self) -> Result<Vec<String>> {
        match self.executor.execute(Command::ListCatalogs)? {
            Output::Catalogs(names) => Ok(names),
            _ => Err(unexpected("ListCatalogs")),
        }
    }

    /// Flush dirty catalogs; returns the ones written.
    pub fn save(&self) -> Result<Vec<String>> {
        match self.executor.execute(Command::Save)? {
            Output::Saved { catalogs } => Ok(catalogs),
            _ => Err(unexpected("Save")),
        }
    }
}
