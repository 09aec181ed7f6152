//! High-level typed wrapper for the Executor.
//!
//! The [`Catalogdb`] struct provides a convenient Rust API that wraps the
//! [`Executor`] and [`Command`]/[`Output`] enums with typed method calls.
//!
//! # Example
//!
//! ```text
//! use catalogdb_executor::Catalogdb;
//! use serde_json::json;
//!
//! let db = Catalogdb::open("/path/to/data")?;
//! let id = db.insert("widgets", json!({"name": "a"}))?;
//! let hits = db.query("widgets", r#".[name eq "a"]"#)?;
//! ```

mod catalog;

use std::path::Path;
use std::sync::Arc;

use catalogdb_engine::{CatalogConfig, Database};

use crate::{Command, Error, Executor, Output, Result};

/// High-level typed wrapper for database operations.
#[derive(Debug, Clone)]
pub struct Catalogdb {
    executor: Executor,
}

impl Catalogdb {
    /// Open a database at the given path.
    ///
    /// The directory is created if it doesn't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Database::open(path)?;
        Ok(Self::from_database(db))
    }

    /// Open with an explicit configuration, written to `catalogdb.toml`.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: CatalogConfig) -> Result<Self> {
        let db = Database::open_with_config(path, config)?;
        Ok(Self::from_database(db))
    }

    /// In-memory database with no files.
    pub fn ephemeral() -> Self {
        Self::from_database(Database::ephemeral())
    }

    /// Wrap an already opened database.
    pub fn from_database(db: Arc<Database>) -> Self {
        Self {
            executor: Executor::new(db),
        }
    }

    /// Low-level command interface.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Execute a raw command.
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        self.executor.execute(cmd)
    }

    /// Check the database responds; returns the crate version.
    pub fn ping(&self) -> Result<String> {
        match self.executor.execute(Command::Ping)? {
            Output::Pong { version } => Ok(version),
            _ => Err(unexpected("Ping")),
        }
    }
}

fn unexpected(command: &str) -> Error {
    Error::Internal {
        reason: format!("Unexpected output for {}", command),
    }
}
