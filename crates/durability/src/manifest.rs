//! Catalog manifest
//!
//! The manifest lists every persisted catalog and the file backing it:
//!
//! ```json
//! {
//!   "catalogs": {
//!     "people": { "filename": "people.json" },
//!     "orders": { "filename": "orders.json", "dirty": true }
//!   }
//! }
//! ```
//!
//! `dirty` is written only when true. A dirty entry on disk means the
//! catalog's file was not rewritten after its last change.
//!
//! Written atomically via temp + rename (same as catalog files).

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use catalogdb_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::atomic::write_atomic;
use crate::paths::catalog_file_name;

/// Manifest entry for a single catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Backing file name, relative to the data directory
    pub filename: String,
    /// In-memory state diverged from the file
    #[serde(default, skip_serializing_if = "is_false")]
    pub dirty: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Catalog name to backing file mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Entries keyed by catalog name
    #[serde(default)]
    pub catalogs: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Manifest::default()
    }

    /// Read a manifest
    ///
    /// Returns `Ok(None)` when the file does not exist. Any other read
    /// failure, or content that is not a manifest, is an error.
    pub fn load(path: &Path) -> Result<Option<Manifest>> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::corruption(format!("manifest {}: {}", path.display(), e)))
    }

    /// Write the manifest atomically, pretty-printed
    pub fn write(&self, path: &Path) -> Result<()> {
        let buf = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &buf)?;
        Ok(())
    }

    /// Entry for `catalog`
    pub fn entry(&self, catalog: &str) -> Option<&ManifestEntry> {
        self.catalogs.get(catalog)
    }

    /// Add `catalog` with its default file name
    ///
    /// Returns `true` if the entry is new. New entries start dirty.
    pub fn register(&mut self, catalog: &str) -> bool {
        if self.catalogs.contains_key(catalog) {
            return false;
        }
        self.catalogs.insert(
            catalog.to_string(),
            ManifestEntry {
                filename: catalog_file_name(catalog),
                dirty: true,
            },
        );
        true
    }

    /// Drop the entry for `catalog`
    pub fn remove(&mut self, catalog: &str) -> Option<ManifestEntry> {
        self.catalogs.remove(catalog)
    }

    /// Set the dirty flag of `catalog`, returning whether it changed
    pub fn set_dirty(&mut self, catalog: &str, dirty: bool) -> bool {
        match self.catalogs.get_mut(catalog) {
            Some(entry) if entry.dirty != dirty => {
                entry.dirty = dirty;
                true
            }
            _ => false,
        }
    }

    /// Number of catalogs listed
    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    /// Check if no catalogs are listed
    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}
