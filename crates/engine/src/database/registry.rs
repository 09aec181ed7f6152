//! Process-wide registry of open databases
//!
//! Opening the same directory twice in one process returns the same
//! [`Database`] instead of failing on the directory lock. Entries are weak,
//! so a database closes when the last caller drops it.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Weak;

use super::Database;

/// Open databases by canonical data directory
pub static OPEN_DATABASES: Lazy<Mutex<HashMap<PathBuf, Weak<Database>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
