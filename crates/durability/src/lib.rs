//! Durability layer for catalogdb
//!
//! This crate handles everything that touches disk:
//!
//! - Data directory layout (manifest, config, lock, one file per catalog)
//! - Manifest: catalog name to backing file, with per-catalog dirty flags
//! - Persistence: load at open, flush dirty catalogs on save, remove files
//! - Atomic file replacement (temp + fsync + rename)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod atomic;
pub mod manifest;
pub mod paths;
pub mod persistence;

pub use manifest::{Manifest, ManifestEntry};
pub use paths::{
    catalog_file_name, fits_name_max, DataPathError, DataPaths, CONFIG_FILE_NAME,
    DEFAULT_MANIFEST_NAME, LOCK_FILE_NAME, MAX_FILE_NAME_BYTES,
};
pub use persistence::{
    LoadReport, LoadResult, Persistence, SaveFailure, SaveReport, SkippedCatalog,
};
