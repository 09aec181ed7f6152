//! The Executor - single entry point to the catalog engine.
//!
//! The Executor is a stateless dispatcher that routes commands to the
//! database and converts results to outputs.

use std::sync::Arc;

use catalogdb_core::Record;
use catalogdb_engine::Database;
use tracing::debug;

use crate::{Command, Error, Output, Result, Value};

/// The command executor - single entry point to the catalog engine.
///
/// The Executor is **stateless**: it holds a handle to the database but
/// maintains no state of its own.
///
/// # Thread Safety
///
/// Executor is `Send + Sync` and can be shared across threads.
///
/// # Example
///
/// ```ignore
/// use catalogdb_executor::{Command, Executor};
/// use catalogdb_engine::Database;
///
/// let executor = Executor::new(Database::ephemeral());
/// let output = executor.execute(Command::ListCatalogs)?;
/// ```
#[derive(Debug, Clone)]
pub struct Executor {
    db: Arc<Database>,
}

impl Executor {
    /// Create a new executor wrapping a database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// The underlying database.
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Execute a single command.
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        debug!(target: "catalogdb::executor", command = cmd.name(), "Executing");
        match cmd {
            Command::Ping => Ok(Output::Pong {
                version: env!("CARGO_PKG_VERSION").to_string(),
            }),
            Command::ListCatalogs => Ok(Output::Catalogs(self.db.catalog_names())),
            Command::Save => {
                let report = self.db.save()?;
                Ok(Output::Saved {
                    catalogs: report.flushed,
                })
            }

            Command::GetCatalog { catalog } => {
                let records = self
                    .db
                    .get_catalog(&catalog)
                    .map(|records| records.into_iter().map(Value::from).collect());
                Ok(Output::Records(records))
            }
            Command::FindRecord { catalog, id } => Ok(Output::MaybeRecord(
                self.db.find_by_id(&catalog, &id).map(Value::from),
            )),
            Command::QueryCatalog { catalog, filter } => {
                Ok(Output::Query(self.db.query_catalog(&catalog, &filter)))
            }

            Command::InsertRecord { catalog, document } => {
                let record = to_record(document)?;
                let id = self.db.insert_record(&catalog, record)?;
                Ok(Output::Inserted {
                    id: id.into_string(),
                })
            }
            Command::UpdateRecord { catalog, document } => {
                let record = to_record(document)?;
                let id = record
                    .id()
                    .map(str::to_string)
                    .ok_or_else(|| Error::invalid_input("Missing document _id"))?;
                if self.db.merge_record(&catalog, record)? {
                    Ok(Output::Unit)
                } else {
                    Err(self.not_found(catalog, id))
                }
            }
            Command::DeleteRecord { catalog, id } => {
                if self.db.delete_record(&catalog, &id)? {
                    Ok(Output::Unit)
                } else {
                    Err(self.not_found(catalog, id))
                }
            }
            Command::DeleteCatalog { catalog } => {
                Ok(Output::Bool(self.db.delete_catalog(&catalog)?))
            }
        }
    }

    /// Execute commands in order, collecting each result.
    ///
    /// A failed command does not stop the ones after it.
    pub fn execute_many(&self, cmds: Vec<Command>) -> Vec<Result<Output>> {
        cmds.into_iter().map(|cmd| self.execute(cmd)).collect()
    }

    fn not_found(&self, catalog: String, id: String) -> Error {
        if self.db.catalog_len(&catalog).is_none() {
            Error::CatalogNotFound { catalog }
        } else {
            Error::RecordNotFound { catalog, id }
        }
    }
}

fn to_record(document: Value) -> Result<Record> {
    Record::from_value(document)
        .ok_or_else(|| Error::invalid_input("document must be a JSON object"))
}
