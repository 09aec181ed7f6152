//! Atomic file replacement
//!
//! Readers see either the old or the new contents of a file, never a torn
//! write. There is no atomicity across files.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Suffix appended to a file's name while it is being replaced
pub const TEMP_SUFFIX: &str = ".tmp";

/// Temporary path used while replacing `path`
pub fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(TEMP_SUFFIX);
    PathBuf::from(tmp)
}

/// Replace `path` with `contents`: write temp, fsync, rename
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let tmp_path = temp_path(path);
    {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path_appends_suffix() {
        assert_eq!(
            temp_path(Path::new("/d/people.json")),
            PathBuf::from("/d/people.json.tmp")
        );
    }

    #[test]
    fn test_write_atomic_replaces_and_cleans_up() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("f.json");
        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"two");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_write_atomic_creates_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("f.json");
        write_atomic(&path, b"x").unwrap();
        assert!(path.exists());
    }
}
