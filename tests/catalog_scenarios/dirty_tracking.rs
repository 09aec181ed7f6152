//! What a save writes after load and after mutations

use catalogdb::{CatalogConfig, Catalogdb, Database};
use serde_json::json;
use tempfile::TempDir;

fn seeded() -> TempDir {
    let dir = TempDir::new().unwrap();
    {
        let db = Catalogdb::open(dir.path()).unwrap();
        db.insert("widgets", json!({"name": "a"})).unwrap();
        db.insert("gadgets", json!({"name": "g"})).unwrap();
        db.save().unwrap();
    }
    dir
}

fn mtime(path: &std::path::Path) -> std::time::SystemTime {
    std::fs::metadata(path).unwrap().modified().unwrap()
}

#[test]
fn save_after_clean_load_writes_nothing() {
    let dir = seeded();
    let db = Database::open(dir.path()).unwrap();
    let report = db.save().unwrap();
    assert!(report.flushed.is_empty());
    assert!(!report.manifest_written);
}

#[test]
fn save_after_one_insert_writes_that_catalog_and_manifest() {
    let dir = seeded();
    let gadgets_before = mtime(&dir.path().join("gadgets.json"));

    let db = Database::open(dir.path()).unwrap();
    let mut r = catalogdb_core::Record::new();
    r.insert("name", "b");
    db.insert_record("widgets", r).unwrap();

    let report = db.save().unwrap();
    assert_eq!(report.flushed, vec!["widgets"]);
    assert!(report.manifest_written);
    assert_eq!(mtime(&dir.path().join("gadgets.json")), gadgets_before);

    let again = db.save().unwrap();
    assert!(again.flushed.is_empty());
}

#[test]
fn facade_save_lists_flushed_catalogs() {
    let dir = TempDir::new().unwrap();
    let db = Catalogdb::open_with_config(dir.path(), CatalogConfig::default()).unwrap();
    db.insert("widgets", json!({"name": "a"})).unwrap();
    assert_eq!(db.save().unwrap(), vec!["widgets"]);
    assert!(db.save().unwrap().is_empty());
}

#[test]
fn reopened_data_matches() {
    let dir = seeded();
    let db = Catalogdb::open(dir.path()).unwrap();
    assert_eq!(db.list_catalogs().unwrap(), vec!["gadgets", "widgets"]);
    let widgets = db.get_catalog("widgets").unwrap().unwrap();
    assert_eq!(widgets.len(), 1);
}
