//! Database configuration via `catalogdb.toml`
//!
//! On first open a default `catalogdb.toml` with comments is written to the
//! data directory. Edit the file and reopen to change settings, or pass a
//! config to [`Database::open_with_config`](super::Database::open_with_config),
//! which writes it back.

use std::path::Path;

use catalogdb_core::{Error, Result};
use catalogdb_durability::{fits_name_max, DEFAULT_MANIFEST_NAME};
use serde::{Deserialize, Serialize};

pub use catalogdb_durability::CONFIG_FILE_NAME;

/// Database configuration loaded from `catalogdb.toml`.
///
/// # Example
///
/// ```toml
/// persist = true
/// save_on_write = false
/// manifest = "catalogdb.json"
/// debug_logging = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Load catalogs at open and write them back on save.
    #[serde(default = "default_true")]
    pub persist: bool,
    /// Save after every successful mutation.
    #[serde(default)]
    pub save_on_write: bool,
    /// Manifest file name inside the data directory.
    #[serde(default = "default_manifest")]
    pub manifest: String,
    /// Log every operation at `info` instead of `trace`.
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_true() -> bool {
    true
}

fn default_manifest() -> String {
    DEFAULT_MANIFEST_NAME.to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            persist: true,
            save_on_write: false,
            manifest: default_manifest(),
            debug_logging: false,
        }
    }
}

impl CatalogConfig {
    /// Check values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the manifest name is not a plain `.json`
    /// file name.
    pub fn validate(&self) -> Result<()> {
        let m = self.manifest.as_str();
        let plain = !m.is_empty()
            && !m.starts_with('.')
            && !m.contains(['/', '\\', '\0'])
            && m.ends_with(".json")
            && fits_name_max(m);
        if !plain {
            return Err(Error::invalid_input(format!(
                "Invalid manifest name '{}' in {}. Expected a plain file name ending in .json.",
                m, CONFIG_FILE_NAME
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# catalogdb configuration
#
# Persist catalogs to this directory (default: true).
# When false the directory only holds this file and the lock.
persist = true

# Save dirty catalogs after every insert, update or delete (default: false).
# When false, changes reach disk on explicit save and on close.
save_on_write = false

# Manifest file listing every catalog and its backing file.
manifest = "catalogdb.json"

# Log every operation at info level (default: false).
debug_logging = false
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::storage(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: CatalogConfig = toml::from_str(&content).map_err(|e| {
            Error::invalid_input(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::storage(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::storage(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::storage(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
