//! Database builder for fluent configuration
//!
//! ```ignore
//! use catalogdb_engine::Database;
//!
//! // 1. Defaults from catalogdb.toml
//! let db = Database::open("/data/catalogs")?;
//!
//! // 2. Builder for collaborators and overrides
//! let db = Database::builder()
//!     .path("/data/catalogs")
//!     .id_generator(SequentialIdGenerator::default())
//!     .save_on_write(true)
//!     .open()?;
//!
//! // 3. Ephemeral (no files)
//! let db = Database::ephemeral();
//! ```

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use catalogdb_core::{Error, IdGenerator, Limits, Result, UuidV7Generator};
use catalogdb_query::{JsPathEvaluator, PathEvaluator};

use super::config::CatalogConfig;
use super::Database;

/// Builder for Database configuration
///
/// Settings not given here come from `catalogdb.toml` in the data
/// directory. An explicit [`config`](Self::config) replaces the file's
/// contents and is written back.
#[derive(Clone)]
pub struct DatabaseBuilder {
    path: Option<PathBuf>,
    config: Option<CatalogConfig>,
    save_on_write: Option<bool>,
    ids: Arc<dyn IdGenerator>,
    evaluator: Arc<dyn PathEvaluator>,
    limits: Limits,
}

impl DatabaseBuilder {
    /// Create new builder with defaults
    ///
    /// UUIDv7 identifiers, the built-in path evaluator and default limits.
    pub fn new() -> Self {
        Self {
            path: None,
            config: None,
            save_on_write: None,
            ids: Arc::new(UuidV7Generator),
            evaluator: Arc::new(JsPathEvaluator::new()),
            limits: Limits::default(),
        }
    }

    /// Set database path
    ///
    /// Required for `open()`.
    pub fn path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Use this config instead of the one in the data directory
    pub fn config(mut self, config: CatalogConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override `save_on_write` for this process only
    pub fn save_on_write(mut self, enabled: bool) -> Self {
        self.save_on_write = Some(enabled);
        self
    }

    /// Source of fresh record identifiers
    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    /// Engine for catalog queries
    pub fn evaluator(mut self, evaluator: impl PathEvaluator + 'static) -> Self {
        self.evaluator = Arc::new(evaluator);
        self
    }

    /// Document and catalog-name limits
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Get the configured path
    pub fn get_path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    /// Open the database
    ///
    /// # Errors
    ///
    /// Returns an error if no path was set, the directory is locked by
    /// another process, the config is invalid, or the manifest is unreadable.
    pub fn open(self) -> Result<Arc<Database>> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| Error::invalid_input("path required, use ephemeral() for no files"))?;
        if let Some(config) = &self.config {
            config.validate()?;
        }
        let config = self.config.clone();
        let save_on_write = self.save_on_write;
        Database::open_internal(path, config, save_on_write, self.into_parts())
    }

    /// Open an in-memory database with this builder's collaborators
    pub fn ephemeral(self) -> Arc<Database> {
        let mut config = self.config.clone().unwrap_or_default();
        if let Some(enabled) = self.save_on_write {
            config.save_on_write = enabled;
        }
        Database::ephemeral_internal(config, self.into_parts())
    }

    fn into_parts(self) -> Collaborators {
        Collaborators {
            ids: self.ids,
            evaluator: self.evaluator,
            limits: self.limits,
        }
    }
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DatabaseBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseBuilder")
            .field("path", &self.path)
            .field("config", &self.config)
            .field("save_on_write", &self.save_on_write)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

/// Pluggable parts handed from the builder to the database
pub(crate) struct Collaborators {
    pub(crate) ids: Arc<dyn IdGenerator>,
    pub(crate) evaluator: Arc<dyn PathEvaluator>,
    pub(crate) limits: Limits,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_default() {
        let builder = DatabaseBuilder::new();
        assert!(builder.get_path().is_none());
    }

    #[test]
    fn test_builder_path() {
        let builder = DatabaseBuilder::new().path("/tmp/catalogs");
        assert_eq!(builder.get_path(), Some(&PathBuf::from("/tmp/catalogs")));
    }

    #[test]
    fn test_open_without_path_fails() {
        assert!(matches!(
            DatabaseBuilder::new().open(),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected_before_open() {
        let dir = tempfile::tempdir().unwrap();
        let config = CatalogConfig {
            manifest: "../escape.json".into(),
            ..CatalogConfig::default()
        };
        let result = DatabaseBuilder::new()
            .path(dir.path())
            .config(config)
            .open();
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(!dir.path().join(".lock").exists());
    }

    #[test]
    fn test_ephemeral_is_not_persistent() {
        let db = DatabaseBuilder::new().save_on_write(true).ephemeral();
        assert!(!db.is_persistent());
        assert!(db.config().save_on_write);
    }
}
