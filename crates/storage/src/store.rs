//! In-memory catalog store
//!
//! `CatalogStore` maps catalog names to [`Catalog`]s. It is the single source
//! of truth for record contents; the durability layer only mirrors it to
//! disk. The store is not internally synchronized: the engine wraps it in a
//! lock and hands out `&`/`&mut` borrows.
//!
//! Lookups report absence with `Option`/`bool`. Errors are reserved for
//! inputs that can never succeed (a record without `_id` on update, a
//! generator that hands out an identifier twice).

use std::collections::BTreeMap;

use catalogdb_core::{Error, IdGenerator, Record, RecordId, Result};
use tracing::debug;

use crate::catalog::Catalog;

/// Result of a successful insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Identifier assigned to the new record
    pub id: RecordId,
    /// True if the insert created the catalog
    pub created_catalog: bool,
}

/// Named catalogs held in memory
#[derive(Debug, Default)]
pub struct CatalogStore {
    catalogs: BTreeMap<String, Catalog>,
}

impl CatalogStore {
    /// Create an empty store
    pub fn new() -> Self {
        CatalogStore {
            catalogs: BTreeMap::new(),
        }
    }

    /// Records of `name` in identifier order, or `None` if the catalog does
    /// not exist
    pub fn get_catalog(&self, name: &str) -> Option<&[Record]> {
        self.catalogs.get(name).map(Catalog::records)
    }

    /// The catalog called `name`
    pub fn catalog(&self, name: &str) -> Option<&Catalog> {
        self.catalogs.get(name)
    }

    /// Record with `id` in catalog `name`
    pub fn find_by_id(&self, name: &str, id: &str) -> Option<&Record> {
        self.catalogs.get(name)?.find(id)
    }

    /// Position of record `id` in catalog `name`
    pub fn find_index_by_id(&self, name: &str, id: &str) -> Option<usize> {
        self.catalogs.get(name)?.find_index(id)
    }

    /// Index at which `id` would be spliced into catalog `name`
    ///
    /// A missing catalog behaves as empty and yields 0.
    pub fn find_insertion_point(&self, name: &str, id: &str) -> usize {
        self.catalogs
            .get(name)
            .map_or(0, |c| c.insertion_point(id))
    }

    /// Insert `record` into catalog `name` under a fresh identifier
    ///
    /// Any `_id` already on the record is overwritten. The catalog is created
    /// when missing. On error the store is unchanged.
    pub fn insert(
        &mut self,
        name: &str,
        mut record: Record,
        ids: &dyn IdGenerator,
    ) -> Result<InsertOutcome> {
        let id = ids.new_id();
        record.set_id(&id);

        let created_catalog = !self.catalogs.contains_key(name);
        if created_catalog {
            let mut catalog = Catalog::new();
            catalog.insert(record)?;
            self.catalogs.insert(name.to_string(), catalog);
            debug!(target: "catalogdb::storage", catalog = name, "Catalog created");
        } else if let Some(catalog) = self.catalogs.get_mut(name) {
            catalog.insert(record)?;
        }

        Ok(InsertOutcome {
            id,
            created_catalog,
        })
    }

    /// Replace the stored record carrying `record`'s `_id`
    ///
    /// Returns `Ok(false)` if the catalog or the identifier does not exist.
    pub fn update(&mut self, name: &str, record: Record) -> Result<bool> {
        if record.id().is_none() {
            return Err(Error::invalid_input("update requires a record with _id"));
        }
        Ok(self
            .catalogs
            .get_mut(name)
            .is_some_and(|c| c.replace(record)))
    }

    /// Remove record `id` from catalog `name`
    ///
    /// The catalog stays registered even when it becomes empty.
    pub fn delete(&mut self, name: &str, id: &str) -> bool {
        self.catalogs
            .get_mut(name)
            .and_then(|c| c.remove(id))
            .is_some()
    }

    /// Drop catalog `name` from memory
    pub fn delete_catalog(&mut self, name: &str) -> bool {
        let removed = self.catalogs.remove(name).is_some();
        if removed {
            debug!(target: "catalogdb::storage", catalog = name, "Catalog dropped");
        }
        removed
    }

    /// Register a catalog read from disk, replacing any previous contents
    ///
    /// Records are sorted into identifier order. Pass `dirty` when the
    /// records were altered while loading.
    pub fn load_catalog(&mut self, name: &str, records: Vec<Record>, dirty: bool) {
        let mut catalog = Catalog::from_records(records);
        if dirty {
            catalog.mark_dirty();
        }
        self.catalogs.insert(name.to_string(), catalog);
    }

    /// Names of all catalogs, sorted
    pub fn catalog_names(&self) -> Vec<String> {
        self.catalogs.keys().cloned().collect()
    }

    /// Iterate over catalogs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Catalog)> {
        self.catalogs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check if a catalog exists
    pub fn contains_catalog(&self, name: &str) -> bool {
        self.catalogs.contains_key(name)
    }

    /// Number of records in catalog `name`
    pub fn len(&self, name: &str) -> Option<usize> {
        self.catalogs.get(name).map(Catalog::len)
    }

    /// Number of catalogs
    pub fn catalog_count(&self) -> usize {
        self.catalogs.len()
    }

    /// Check if the store has no catalogs
    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    /// Names of catalogs changed since their last flush
    pub fn dirty_catalogs(&self) -> Vec<String> {
        self.catalogs
            .iter()
            .filter(|(_, c)| c.is_dirty())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Check if catalog `name` has unflushed changes
    pub fn is_dirty(&self, name: &str) -> bool {
        self.catalogs.get(name).is_some_and(Catalog::is_dirty)
    }

    /// Flag catalog `name` as flushed
    pub fn mark_clean(&mut self, name: &str) {
        if let Some(c) = self.catalogs.get_mut(name) {
            c.mark_clean();
        }
    }

    /// Flag catalog `name` as changed
    pub fn mark_dirty(&mut self, name: &str) {
        if let Some(c) = self.catalogs.get_mut(name) {
            c.mark_dirty();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalogdb_core::{SequentialIdGenerator, Value};

    /// Generator that always returns the same id
    struct FixedId(&'static str);

    impl IdGenerator for FixedId {
        fn new_id(&self) -> RecordId {
            RecordId::from(self.0)
        }
    }

    fn named(name: &str) -> Record {
        let mut r = Record::new();
        r.insert("name", name);
        r
    }

    #[test]
    fn test_insert_creates_catalog() {
        let mut store = CatalogStore::new();
        let ids = SequentialIdGenerator::default();
        let out = store.insert("people", named("a"), &ids).unwrap();
        assert!(out.created_catalog);
        assert_eq!(store.len("people"), Some(1));
        assert!(store.is_dirty("people"));

        let again = store.insert("people", named("b"), &ids).unwrap();
        assert!(!again.created_catalog);
        assert_eq!(store.len("people"), Some(2));
    }

    #[test]
    fn test_insert_overwrites_caller_id() {
        let mut store = CatalogStore::new();
        let mut r = named("a");
        r.insert("_id", "caller-chosen");
        let out = store.insert("c", r, &FixedId("fresh")).unwrap();
        assert_eq!(out.id.as_str(), "fresh");
        assert!(store.find_by_id("c", "caller-chosen").is_none());
        assert!(store.find_by_id("c", "fresh").is_some());
    }

    #[test]
    fn test_insert_duplicate_id_leaves_store_unchanged() {
        let mut store = CatalogStore::new();
        store.insert("c", named("a"), &FixedId("x")).unwrap();
        store.mark_clean("c");
        let err = store.insert("c", named("b"), &FixedId("x")).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(store.len("c"), Some(1));
        assert!(!store.is_dirty("c"));
    }

    #[test]
    fn test_get_catalog_missing_vs_empty() {
        let mut store = CatalogStore::new();
        assert!(store.get_catalog("nope").is_none());
        store.load_catalog("empty", Vec::new(), false);
        assert_eq!(store.get_catalog("empty").map(<[Record]>::len), Some(0));
    }

    #[test]
    fn test_find_insertion_point_missing_catalog() {
        let store = CatalogStore::new();
        assert_eq!(store.find_insertion_point("nope", "anything"), 0);
    }

    #[test]
    fn test_update_replaces_whole_record() {
        let mut store = CatalogStore::new();
        let mut r = named("a");
        r.insert("age", 3);
        let id = store.insert("c", r, &FixedId("k")).unwrap().id;

        let mut replacement = Record::new();
        replacement.set_id(&id);
        replacement.insert("name", "b");
        assert!(store.update("c", replacement).unwrap());

        let stored = store.find_by_id("c", "k").unwrap();
        assert_eq!(stored.get("name"), Some(&Value::from("b")));
        assert!(stored.get("age").is_none());
    }

    #[test]
    fn test_update_unknown_id_or_catalog() {
        let mut store = CatalogStore::new();
        store.insert("c", named("a"), &FixedId("k")).unwrap();
        let mut ghost = named("g");
        ghost.insert("_id", "missing");
        assert!(!store.update("c", ghost.clone()).unwrap());
        assert!(!store.update("other", ghost).unwrap());
        assert!(store.update("c", named("no id")).is_err());
    }

    #[test]
    fn test_delete_keeps_empty_catalog() {
        let mut store = CatalogStore::new();
        store.insert("c", named("a"), &FixedId("k")).unwrap();
        assert!(store.delete("c", "k"));
        assert!(!store.delete("c", "k"));
        assert!(store.contains_catalog("c"));
        assert_eq!(store.len("c"), Some(0));
    }

    #[test]
    fn test_delete_catalog() {
        let mut store = CatalogStore::new();
        store.insert("c", named("a"), &FixedId("k")).unwrap();
        assert!(store.delete_catalog("c"));
        assert!(!store.delete_catalog("c"));
        assert!(store.get_catalog("c").is_none());
    }

    #[test]
    fn test_load_catalog_sorts_and_tracks_dirty() {
        let mut store = CatalogStore::new();
        let records: Vec<Record> = ["c", "a", "b"]
            .iter()
            .map(|id| {
                let mut r = Record::new();
                r.insert("_id", *id);
                r
            })
            .collect();
        store.load_catalog("x", records.clone(), false);
        store.load_catalog("y", records, true);

        assert!(store.catalog("x").unwrap().is_sorted());
        assert_eq!(store.find_index_by_id("x", "a"), Some(0));
        assert_eq!(store.dirty_catalogs(), vec!["y".to_string()]);
    }

    #[test]
    fn test_catalog_names_sorted() {
        let mut store = CatalogStore::new();
        let ids = SequentialIdGenerator::default();
        for name in ["zeta", "alpha", "mid"] {
            store.insert(name, Record::new(), &ids).unwrap();
        }
        assert_eq!(store.catalog_names(), vec!["alpha", "mid", "zeta"]);
        assert_eq!(store.catalog_count(), 3);
    }
}
