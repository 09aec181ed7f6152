//! Database: the catalog service object
//!
//! A `Database` owns the catalog store, the persistence manager, the
//! identifier generator and the query evaluator. All access goes through a
//! single reader-writer lock: reads share, mutations are exclusive, so an
//! insertion point is never computed against a catalog another thread is
//! splicing.
//!
//! ## Lifecycle
//!
//! - `open` creates the directory, takes an exclusive lock on `.lock`,
//!   reads `catalogdb.toml` and loads every catalog the manifest lists
//! - mutations mark catalogs dirty; `save` flushes them (or every mutation
//!   does when `save_on_write` is set)
//! - dropping the last handle performs a final save and releases the lock

pub mod builder;
pub mod config;
mod registry;

pub use builder::DatabaseBuilder;
pub use config::{CatalogConfig, CONFIG_FILE_NAME};
pub use registry::OPEN_DATABASES;

use std::collections::BTreeSet;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use catalogdb_core::{Error, IdGenerator, Limits, Record, RecordId, Result};
use catalogdb_durability::{catalog_file_name, DataPaths, LoadReport, Persistence, SaveReport};
use catalogdb_query::{query_catalog, PathEvaluator, QueryOutcome};
use catalogdb_storage::CatalogStore;
use parking_lot::RwLock;
use tracing::{info, trace, warn};

use builder::Collaborators;

struct State {
    store: CatalogStore,
    persistence: Option<Persistence>,
    /// Catalogs listed in the manifest whose files could not be read
    unloaded: BTreeSet<String>,
}

/// Catalog database
///
/// Obtain one with [`Database::open`], [`Database::ephemeral`] or
/// [`Database::builder`]. Handles are shared as `Arc<Database>`; opening
/// the same directory twice in one process returns the same instance.
pub struct Database {
    state: RwLock<State>,
    ids: Arc<dyn IdGenerator>,
    evaluator: Arc<dyn PathEvaluator>,
    limits: Limits,
    config: CatalogConfig,
    /// Canonical data directory, `None` when ephemeral
    data_dir: Option<PathBuf>,
    lock_file: Option<File>,
    load_report: LoadReport,
}

impl Database {
    /// Open the database in `path`, creating the directory if needed
    ///
    /// Settings come from `catalogdb.toml`; a commented default is written
    /// on first open.
    ///
    /// # Errors
    ///
    /// Fails if the directory is locked by another process, the config is
    /// invalid, or the manifest cannot be parsed. Unreadable catalog files
    /// are skipped, not fatal.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Arc<Self>> {
        Self::builder().path(path.as_ref()).open()
    }

    /// Open with an explicit configuration
    ///
    /// The config is written to `catalogdb.toml` so later opens pick it up.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: CatalogConfig) -> Result<Arc<Self>> {
        Self::builder().path(path.as_ref()).config(config).open()
    }

    /// In-memory database with no files
    pub fn ephemeral() -> Arc<Self> {
        Self::builder().ephemeral()
    }

    /// Builder for custom collaborators and overrides
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    pub(crate) fn open_internal(
        path: PathBuf,
        config: Option<CatalogConfig>,
        save_on_write: Option<bool>,
        parts: Collaborators,
    ) -> Result<Arc<Self>> {
        std::fs::create_dir_all(&path)?;
        let canonical_path = path.canonicalize()?;

        // Held until the new instance is registered.
        let mut registry = OPEN_DATABASES.lock();
        if let Some(db) = registry.get(&canonical_path).and_then(Weak::upgrade) {
            info!(target: "catalogdb::db", path = ?canonical_path, "Returning existing database instance");
            return Ok(db);
        }

        let paths = DataPaths::from_root(&canonical_path);
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(paths.lock_file())
            .map_err(|e| Error::storage(format!("failed to open lock file: {}", e)))?;
        fs2::FileExt::try_lock_exclusive(&lock_file).map_err(|_| {
            Error::storage(format!(
                "database at '{}' is already in use by another process",
                canonical_path.display()
            ))
        })?;

        let config_path = paths.config();
        let mut config = match config {
            Some(config) => {
                config.write_to_file(&config_path)?;
                config
            }
            None => {
                CatalogConfig::write_default_if_missing(&config_path)?;
                CatalogConfig::from_file(&config_path)?
            }
        };
        if let Some(enabled) = save_on_write {
            config.save_on_write = enabled;
        }

        let (store, persistence, load_report) = if config.persist {
            let paths = paths.with_manifest_name(config.manifest.clone());
            let loaded = Persistence::load(paths, parts.ids.as_ref())?;
            (loaded.store, Some(loaded.persistence), loaded.report)
        } else {
            (CatalogStore::new(), None, LoadReport::default())
        };

        info!(
            target: "catalogdb::db",
            path = ?canonical_path,
            catalogs = store.catalog_count(),
            persist = config.persist,
            save_on_write = config.save_on_write,
            "Database opened"
        );

        let unloaded = load_report
            .skipped
            .iter()
            .map(|s| s.catalog.clone())
            .collect();
        let db = Arc::new(Database {
            state: RwLock::new(State {
                store,
                persistence,
                unloaded,
            }),
            ids: parts.ids,
            evaluator: parts.evaluator,
            limits: parts.limits,
            config,
            data_dir: Some(canonical_path.clone()),
            lock_file: Some(lock_file),
            load_report,
        });
        registry.insert(canonical_path, Arc::downgrade(&db));
        Ok(db)
    }

    pub(crate) fn ephemeral_internal(config: CatalogConfig, parts: Collaborators) -> Arc<Self> {
        Arc::new(Database {
            state: RwLock::new(State {
                store: CatalogStore::new(),
                persistence: None,
                unloaded: BTreeSet::new(),
            }),
            ids: parts.ids,
            evaluator: parts.evaluator,
            limits: parts.limits,
            config,
            data_dir: None,
            lock_file: None,
            load_report: LoadReport::default(),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Active configuration
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Canonical data directory, `None` when ephemeral
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Check if catalogs are written to disk
    pub fn is_persistent(&self) -> bool {
        self.state.read().persistence.is_some()
    }

    /// What happened when catalogs were loaded at open
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    /// Document and catalog-name limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// All records of a catalog in identifier order
    pub fn get_catalog(&self, catalog: &str) -> Option<Vec<Record>> {
        self.state.read().store.get_catalog(catalog).map(<[Record]>::to_vec)
    }

    /// Record with identifier `id`
    pub fn find_by_id(&self, catalog: &str, id: &str) -> Option<Record> {
        self.state.read().store.find_by_id(catalog, id).cloned()
    }

    /// Evaluate a filter against a catalog
    pub fn query_catalog(&self, catalog: &str, filter: &str) -> QueryOutcome {
        self.log_op("query", catalog);
        let state = self.state.read();
        query_catalog(&state.store, catalog, filter, self.evaluator.as_ref())
    }

    /// Catalog names in order
    pub fn catalog_names(&self) -> Vec<String> {
        self.state.read().store.catalog_names()
    }

    /// Number of records in a catalog
    pub fn catalog_len(&self, catalog: &str) -> Option<usize> {
        self.state.read().store.len(catalog)
    }

    /// Catalogs with changes not yet saved
    pub fn dirty_catalogs(&self) -> Vec<String> {
        self.state.read().store.dirty_catalogs()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Insert a record under a fresh identifier
    ///
    /// Any `_id` on `record` is replaced. The catalog is created on first
    /// insert.
    ///
    /// # Errors
    ///
    /// `Limit` for a bad catalog name or oversized document, `InvalidInput`
    /// for a catalog whose file name is reserved or too long, `Conflict` for
    /// a catalog whose file could not be read at open.
    pub fn insert_record(&self, catalog: &str, record: Record) -> Result<RecordId> {
        self.limits.validate_catalog_name(catalog)?;
        self.limits.validate_record(&record)?;

        let mut state = self.state.write();
        if state.unloaded.contains(catalog) {
            warn!(target: "catalogdb::db", catalog, "Insert into unloaded catalog refused");
            return Err(Error::Conflict(format!(
                "catalog '{}' could not be loaded at open; fix its file and reopen, or delete the catalog",
                catalog
            )));
        }
        if !state.store.contains_catalog(catalog) {
            if let Some(persistence) = &state.persistence {
                persistence
                    .paths()
                    .catalog_file(&catalog_file_name(catalog))
                    .map_err(|e| Error::invalid_input(e.to_string()))?;
            }
        }

        let outcome = state.store.insert(catalog, record, self.ids.as_ref())?;
        if outcome.created_catalog {
            if let Some(persistence) = state.persistence.as_mut() {
                persistence.register(catalog);
            }
        }
        self.log_op("insert", catalog);
        self.after_write(&mut state)?;
        Ok(outcome.id)
    }

    /// Replace the stored record with the same `_id`
    ///
    /// Returns `false` if no such record exists.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `record` has no string `_id`.
    pub fn update_record(&self, catalog: &str, record: Record) -> Result<bool> {
        if record.id().is_none() {
            return Err(Error::invalid_input("record has no _id"));
        }
        self.limits.validate_record(&record)?;

        let mut state = self.state.write();
        let replaced = state.store.update(catalog, record)?;
        if replaced {
            self.log_op("update", catalog);
            self.after_write(&mut state)?;
        }
        Ok(replaced)
    }

    /// Merge `patch` over the stored record with the same `_id`
    ///
    /// Fields in `patch` overwrite, fields absent from it are kept.
    /// Returns `false` if no such record exists.
    pub fn merge_record(&self, catalog: &str, patch: Record) -> Result<bool> {
        let id = patch
            .id()
            .ok_or_else(|| Error::invalid_input("record has no _id"))?
            .to_string();

        let mut state = self.state.write();
        let Some(stored) = state.store.find_by_id(catalog, &id) else {
            return Ok(false);
        };
        let mut merged = stored.clone();
        merged.merge_from(patch);
        self.limits.validate_record(&merged)?;

        state.store.update(catalog, merged)?;
        self.log_op("merge", catalog);
        self.after_write(&mut state)?;
        Ok(true)
    }

    /// Remove the record with identifier `id`
    ///
    /// Returns `false` if no such record exists.
    pub fn delete_record(&self, catalog: &str, id: &str) -> Result<bool> {
        let mut state = self.state.write();
        let removed = state.store.delete(catalog, id);
        if removed {
            self.log_op("delete", catalog);
            self.after_write(&mut state)?;
        }
        Ok(removed)
    }

    /// Drop a whole catalog and its backing file
    ///
    /// Returns whether the catalog existed in memory or on disk. Deleting a
    /// catalog that could not be loaded at open makes its name usable again.
    pub fn delete_catalog(&self, catalog: &str) -> Result<bool> {
        let mut state = self.state.write();
        let on_disk = match state.persistence.as_mut() {
            Some(persistence) => persistence.remove_catalog(catalog)?,
            None => false,
        };
        state.unloaded.remove(catalog);
        let in_memory = state.store.delete_catalog(catalog);
        if in_memory || on_disk {
            self.log_op("delete_catalog", catalog);
        }
        Ok(in_memory || on_disk)
    }

    /// Flush every dirty catalog and the manifest
    ///
    /// A no-op when nothing is persisted.
    ///
    /// # Errors
    ///
    /// `Storage` naming every file that could not be written. Catalogs
    /// that failed stay dirty and are retried on the next save.
    pub fn save(&self) -> Result<SaveReport> {
        let mut state = self.state.write();
        self.save_locked(&mut state)
    }

    fn save_locked(&self, state: &mut State) -> Result<SaveReport> {
        let State { store, persistence, .. } = state;
        let Some(persistence) = persistence.as_mut() else {
            return Ok(SaveReport::default());
        };
        let report = persistence.save(store);
        if report.is_success() {
            return Ok(report);
        }
        let failures: Vec<String> = report
            .failed
            .iter()
            .map(|f| match &f.catalog {
                Some(catalog) => format!("{}: {}", catalog, f.reason),
                None => format!("manifest: {}", f.reason),
            })
            .collect();
        Err(Error::storage(format!("save failed ({})", failures.join("; "))))
    }

    fn after_write(&self, state: &mut State) -> Result<()> {
        if self.config.save_on_write {
            self.save_locked(state)?;
        }
        Ok(())
    }

    fn log_op(&self, op: &'static str, catalog: &str) {
        if self.config.debug_logging {
            info!(target: "catalogdb::db", op, catalog, "Operation");
        } else {
            trace!(target: "catalogdb::db", op, catalog, "Operation");
        }
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("data_dir", &self.data_dir)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        let State { store, persistence, .. } = self.state.get_mut();
        if let Some(persistence) = persistence.as_mut() {
            let report = persistence.save(store);
            if !report.is_success() {
                warn!(
                    target: "catalogdb::db",
                    failed = report.failed.len(),
                    "Final save incomplete, unsaved catalogs are lost"
                );
            }
        }

        if let Some(lock_file) = self.lock_file.take() {
            let _ = fs2::FileExt::unlock(&lock_file);
        }

        // Another thread may already have reopened the directory.
        if let Some(dir) = &self.data_dir {
            let mut registry = OPEN_DATABASES.lock();
            if registry.get(dir).is_some_and(|w| w.strong_count() == 0) {
                registry.remove(dir);
            }
        }
    }
}
