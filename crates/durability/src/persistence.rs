//! Persistence manager
//!
//! Mirrors a [`CatalogStore`] to the data directory:
//!
//! - `load` reads the manifest and every catalog file it lists
//! - `save` rewrites the file of every dirty catalog, then the manifest
//! - `remove_catalog` unlinks a catalog's file and drops its manifest entry
//!
//! Each file is replaced atomically. There is no atomicity across files: a
//! crash between two catalog writes leaves each file either old or new.

use std::collections::HashSet;
use std::io;
use std::path::Path;

use catalogdb_core::{Error, IdGenerator, Record, RecordId, Result, Value, ID_FIELD};
use catalogdb_storage::CatalogStore;
use tracing::{debug, info, warn};

use crate::atomic::write_atomic;
use crate::manifest::Manifest;
use crate::paths::DataPaths;

/// A catalog that could not be read at load time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCatalog {
    /// Catalog name
    pub catalog: String,
    /// Why it was skipped
    pub reason: String,
}

/// Summary of a load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Catalogs loaded, in name order
    pub loaded: Vec<String>,
    /// Catalogs listed in the manifest but unreadable
    pub skipped: Vec<SkippedCatalog>,
    /// Records that received a fresh `_id` while loading
    pub ids_assigned: usize,
}

/// Output of [`Persistence::load`]
#[derive(Debug)]
pub struct LoadResult {
    /// Persistence manager bound to the data directory
    pub persistence: Persistence,
    /// Catalogs read from disk
    pub store: CatalogStore,
    /// What happened
    pub report: LoadReport,
}

/// A file that could not be written at save time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFailure {
    /// Catalog name, or `None` for the manifest
    pub catalog: Option<String>,
    /// Error message
    pub reason: String,
}

/// Summary of a save
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Catalogs whose files were rewritten
    pub flushed: Vec<String>,
    /// Writes that failed; failed catalogs stay dirty
    pub failed: Vec<SaveFailure>,
    /// Whether the manifest was rewritten
    pub manifest_written: bool,
}

impl SaveReport {
    /// Check if every write succeeded
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Binds a manifest to its data directory
#[derive(Debug)]
pub struct Persistence {
    paths: DataPaths,
    manifest: Manifest,
    /// In-memory manifest differs from the file after a failed write
    manifest_pending: bool,
}

impl Persistence {
    /// Start with an empty manifest, ignoring anything on disk
    pub fn new(paths: DataPaths) -> Self {
        Persistence {
            paths,
            manifest: Manifest::new(),
            manifest_pending: false,
        }
    }

    /// Read the manifest and every catalog it lists
    ///
    /// A missing manifest yields an empty store. A catalog file that is
    /// missing or unparsable is logged and skipped; its manifest entry is
    /// kept. Records without a usable `_id`, or repeating an `_id` seen
    /// earlier in the same file, get a fresh one and leave the catalog dirty.
    ///
    /// An unparsable manifest is an error.
    pub fn load(paths: DataPaths, ids: &dyn IdGenerator) -> Result<LoadResult> {
        let manifest = match Manifest::load(&paths.manifest())? {
            Some(m) => m,
            None => {
                debug!(target: "catalogdb::durability", path = ?paths.manifest(), "No manifest, starting empty");
                return Ok(LoadResult {
                    persistence: Persistence::new(paths),
                    store: CatalogStore::new(),
                    report: LoadReport::default(),
                });
            }
        };

        let mut store = CatalogStore::new();
        let mut report = LoadReport::default();

        for (name, entry) in &manifest.catalogs {
            let loaded = paths
                .catalog_file(&entry.filename)
                .map_err(|e| Error::corruption(e.to_string()))
                .and_then(|path| read_catalog(&path, ids));

            match loaded {
                Ok((records, assigned)) => {
                    debug!(
                        target: "catalogdb::durability",
                        catalog = %name,
                        records = records.len(),
                        ids_assigned = assigned,
                        "Catalog loaded"
                    );
                    store.load_catalog(name, records, entry.dirty || assigned > 0);
                    report.ids_assigned += assigned;
                    report.loaded.push(name.clone());
                }
                Err(e) => {
                    warn!(
                        target: "catalogdb::durability",
                        catalog = %name,
                        file = %entry.filename,
                        error = %e,
                        "Skipping unreadable catalog"
                    );
                    report.skipped.push(SkippedCatalog {
                        catalog: name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            target: "catalogdb::durability",
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            ids_assigned = report.ids_assigned,
            "Database loaded"
        );

        Ok(LoadResult {
            persistence: Persistence {
                paths,
                manifest,
                manifest_pending: false,
            },
            store,
            report,
        })
    }

    /// Check if the manifest on disk is behind the in-memory one
    pub fn manifest_pending(&self) -> bool {
        self.manifest_pending
    }

    /// Data directory paths
    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// In-memory manifest
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Add a newly created catalog to the manifest
    pub fn register(&mut self, catalog: &str) -> bool {
        self.manifest.register(catalog)
    }

    /// Flush every dirty catalog, then the manifest
    ///
    /// The manifest is rewritten if any catalog was flushed, any entry
    /// changed, or an earlier manifest write failed. A failed catalog write
    /// leaves that catalog dirty and does not stop the others.
    pub fn save(&mut self, store: &mut CatalogStore) -> SaveReport {
        let mut report = SaveReport::default();
        let mut manifest_changed = false;

        for name in store.dirty_catalogs() {
            manifest_changed |= self.manifest.register(&name);
            match self.flush_catalog(store, &name) {
                Ok(records) => {
                    debug!(target: "catalogdb::durability", catalog = %name, records, "Catalog flushed");
                    store.mark_clean(&name);
                    manifest_changed |= self.manifest.set_dirty(&name, false);
                    report.flushed.push(name);
                }
                Err(e) => {
                    warn!(target: "catalogdb::durability", catalog = %name, error = %e, "Catalog flush failed");
                    manifest_changed |= self.manifest.set_dirty(&name, true);
                    report.failed.push(SaveFailure {
                        catalog: Some(name),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if manifest_changed || self.manifest_pending || !report.flushed.is_empty() {
            match self.manifest.write(&self.paths.manifest()) {
                Ok(()) => {
                    self.manifest_pending = false;
                    report.manifest_written = true;
                }
                Err(e) => {
                    warn!(target: "catalogdb::durability", error = %e, "Manifest write failed");
                    self.manifest_pending = true;
                    report.failed.push(SaveFailure {
                        catalog: None,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !report.flushed.is_empty() || !report.failed.is_empty() {
            info!(
                target: "catalogdb::durability",
                flushed = report.flushed.len(),
                failed = report.failed.len(),
                "Save complete"
            );
        }
        report
    }

    /// Delete a catalog's backing file and manifest entry
    ///
    /// A file that is already gone is not an error. Returns whether the
    /// manifest listed the catalog.
    pub fn remove_catalog(&mut self, catalog: &str) -> Result<bool> {
        let Some(entry) = self.manifest.remove(catalog) else {
            return Ok(false);
        };
        if let Ok(path) = self.paths.catalog_file(&entry.filename) {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    // Keep the entry so a retry can find the file.
                    self.manifest.catalogs.insert(catalog.to_string(), entry);
                    return Err(Error::Io(e));
                }
            }
        }
        if let Err(e) = self.manifest.write(&self.paths.manifest()) {
            self.manifest_pending = true;
            return Err(e);
        }
        self.manifest_pending = false;
        info!(target: "catalogdb::durability", catalog, "Catalog removed");
        Ok(true)
    }

    fn flush_catalog(&self, store: &CatalogStore, name: &str) -> Result<usize> {
        let entry = self
            .manifest
            .entry(name)
            .ok_or_else(|| Error::storage(format!("catalog {} is not in the manifest", name)))?;
        let path = self
            .paths
            .catalog_file(&entry.filename)
            .map_err(|e| Error::storage(e.to_string()))?;
        let records = store.get_catalog(name).unwrap_or_default();
        let buf = serde_json::to_vec_pretty(records)?;
        write_atomic(&path, &buf)?;
        Ok(records.len())
    }
}

/// Read one catalog file, fixing up identifiers
///
/// Returns the records and how many of them received a fresh `_id`.
fn read_catalog(path: &Path, ids: &dyn IdGenerator) -> Result<(Vec<Record>, usize)> {
    let bytes = std::fs::read(path)?;
    let json: serde_json::Value = serde_json::from_slice(&bytes)?;
    let serde_json::Value::Array(items) = json else {
        return Err(Error::corruption("catalog file is not a JSON array"));
    };

    let mut seen = HashSet::with_capacity(items.len());
    let mut assigned = 0;
    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let mut record = Record::from_value(Value::from(item))
            .ok_or_else(|| Error::corruption(format!("element {} is not an object", i)))?;
        if normalize_id(&mut record, &seen, ids) {
            assigned += 1;
        }
        seen.insert(record.sort_key().to_string());
        records.push(record);
    }
    Ok((records, assigned))
}

/// Make sure `record` carries a unique non-empty string `_id`
///
/// Non-string ids keep their JSON text as the new string id. Missing, null,
/// empty and already-seen ids are replaced. Returns whether `_id` changed.
fn normalize_id(record: &mut Record, seen: &HashSet<String>, ids: &dyn IdGenerator) -> bool {
    let replacement = match record.get(ID_FIELD) {
        Some(Value::String(s)) if !s.is_empty() && !seen.contains(s) => None,
        None | Some(Value::Null) | Some(Value::String(_)) => Some(ids.new_id()),
        Some(other) => {
            let text = other.to_string();
            if seen.contains(&text) {
                Some(ids.new_id())
            } else {
                Some(RecordId::new(text))
            }
        }
    };
    match replacement {
        Some(id) => {
            record.set_id(&id);
            true
        }
        None => false,
    }
}
