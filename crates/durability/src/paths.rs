//! Data directory structure
//!
//! A database is a flat directory of JSON files:
//!
//! ```text
//! data/
//! ├── catalogdb.json   # Manifest: catalog name -> backing file
//! ├── catalogdb.toml   # Configuration
//! ├── .lock            # Exclusive process lock
//! ├── people.json      # One pretty-printed array per catalog
//! └── ...
//! ```

use std::path::{Path, PathBuf};

use crate::atomic::TEMP_SUFFIX;

/// Default manifest file name
pub const DEFAULT_MANIFEST_NAME: &str = "catalogdb.json";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "catalogdb.toml";

/// Lock file name
pub const LOCK_FILE_NAME: &str = ".lock";

/// Longest file name most filesystems accept (`NAME_MAX`)
pub const MAX_FILE_NAME_BYTES: usize = 255;

/// Data directory paths
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
    manifest_name: String,
}

impl DataPaths {
    /// Create paths from root directory with the default manifest name
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        DataPaths {
            root: root.as_ref().to_path_buf(),
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
        }
    }

    /// Use a different manifest file name
    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    /// Get the root data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the manifest file name
    pub fn manifest_name(&self) -> &str {
        &self.manifest_name
    }

    /// Get the manifest file path
    pub fn manifest(&self) -> PathBuf {
        self.root.join(&self.manifest_name)
    }

    /// Get the config file path
    pub fn config(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    /// Get the lock file path
    pub fn lock_file(&self) -> PathBuf {
        self.root.join(LOCK_FILE_NAME)
    }

    /// Path of a catalog's backing file
    ///
    /// Fails for names that would escape the data directory, shadow one
    /// of the database's own files, or whose temp file name would exceed
    /// [`MAX_FILE_NAME_BYTES`].
    pub fn catalog_file(&self, filename: &str) -> Result<PathBuf, DataPathError> {
        if !is_plain_file_name(filename) {
            return Err(DataPathError::UnsafeFileName {
                name: filename.to_string(),
            });
        }
        if !fits_name_max(filename) {
            return Err(DataPathError::TooLong {
                len: filename.len(),
                max: MAX_FILE_NAME_BYTES - TEMP_SUFFIX.len(),
            });
        }
        if self.is_reserved(filename) {
            return Err(DataPathError::Reserved {
                name: filename.to_string(),
            });
        }
        Ok(self.root.join(filename))
    }

    /// Check if `filename` is one of the database's own files
    pub fn is_reserved(&self, filename: &str) -> bool {
        filename == self.manifest_name || filename == CONFIG_FILE_NAME || filename == LOCK_FILE_NAME
    }

    /// Check if a database exists at this path
    ///
    /// A database exists if the manifest file is present.
    pub fn exists(&self) -> bool {
        self.manifest().exists()
    }

    /// Create the data directory
    pub fn create_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }
}

/// Backing file name for a catalog
pub fn catalog_file_name(catalog: &str) -> String {
    format!("{}.json", catalog)
}

/// Check that `name` and its temp file name both fit in a directory entry
pub fn fits_name_max(name: &str) -> bool {
    name.len() + TEMP_SUFFIX.len() <= MAX_FILE_NAME_BYTES
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
}

/// Data directory path errors
#[derive(Debug, thiserror::Error)]
pub enum DataPathError {
    /// File name contains a separator, NUL or leading dot
    #[error("unsafe catalog file name {name:?}")]
    UnsafeFileName {
        /// Offending name
        name: String,
    },

    /// File name plus temp suffix is longer than the filesystem allows
    #[error("catalog file name is {len} bytes, at most {max} are allowed")]
    TooLong {
        /// Length of the file name
        len: usize,
        /// Longest allowed file name
        max: usize,
    },

    /// File name collides with the manifest, config or lock file
    #[error("catalog file name {name:?} is reserved")]
    Reserved {
        /// Offending name
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths_from_root() {
        let paths = DataPaths::from_root("/tmp/data");

        assert_eq!(paths.root(), Path::new("/tmp/data"));
        assert_eq!(paths.manifest(), PathBuf::from("/tmp/data/catalogdb.json"));
        assert_eq!(paths.config(), PathBuf::from("/tmp/data/catalogdb.toml"));
        assert_eq!(paths.lock_file(), PathBuf::from("/tmp/data/.lock"));
        assert_eq!(
            paths.catalog_file("people.json").unwrap(),
            PathBuf::from("/tmp/data/people.json")
        );
    }

    #[test]
    fn test_custom_manifest_name() {
        let paths = DataPaths::from_root("/tmp/data").with_manifest_name("jmdb.json");
        assert_eq!(paths.manifest(), PathBuf::from("/tmp/data/jmdb.json"));
        assert!(paths.is_reserved("jmdb.json"));
        assert!(!paths.is_reserved("catalogdb.json"));
    }

    #[test]
    fn test_catalog_file_rejects_unsafe_names() {
        let paths = DataPaths::from_root("/tmp/data");
        assert!(matches!(
            paths.catalog_file("../etc/passwd"),
            Err(DataPathError::UnsafeFileName { .. })
        ));
        assert!(paths.catalog_file(".hidden.json").is_err());
        assert!(paths.catalog_file("").is_err());
        assert!(matches!(
            paths.catalog_file("catalogdb.json"),
            Err(DataPathError::Reserved { .. })
        ));
    }

    #[test]
    fn test_catalog_file_rejects_names_past_name_max() {
        let paths = DataPaths::from_root("/tmp/data");
        let longest = format!("{}.json", "w".repeat(246));
        assert_eq!(longest.len() + TEMP_SUFFIX.len(), MAX_FILE_NAME_BYTES);
        assert!(paths.catalog_file(&longest).is_ok());

        let too_long = format!("{}.json", "w".repeat(247));
        assert!(matches!(
            paths.catalog_file(&too_long),
            Err(DataPathError::TooLong { max: 251, .. })
        ));
    }

    #[test]
    fn test_catalog_file_name() {
        assert_eq!(catalog_file_name("people"), "people.json");
    }

    #[test]
    fn test_exists() {
        let dir = tempdir().unwrap();
        let paths = DataPaths::from_root(dir.path().join("db"));
        assert!(!paths.exists());

        paths.create_directories().unwrap();
        assert!(!paths.exists());

        std::fs::write(paths.manifest(), b"{\"catalogs\":{}}").unwrap();
        assert!(paths.exists());
    }
}
