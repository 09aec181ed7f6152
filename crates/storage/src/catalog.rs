//! A single catalog: records kept sorted by identifier
//!
//! # Invariant
//!
//! `records` is sorted in non-decreasing order of `_id` under
//! [`compare_ids`] at all times. Every method that mutates the sequence
//! either preserves that order or leaves the catalog untouched, which is what
//! lets lookup and insertion run as binary searches.

use catalogdb_core::{compare_ids, Error, Record, RecordId, Result};

/// Ordered sequence of records plus its dirty flag
///
/// The dirty flag is set by every successful mutation and cleared by the
/// persistence layer once the catalog has been flushed to disk.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<Record>,
    dirty: bool,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Catalog {
            records: Vec::new(),
            dirty: false,
        }
    }

    /// Build a catalog from records in any order
    ///
    /// Records are stably sorted into identifier order, so files written by
    /// other tools (or by hand) load correctly.
    pub fn from_records(mut records: Vec<Record>) -> Self {
        records.sort_by(|a, b| compare_ids(a.sort_key(), b.sort_key()));
        Catalog {
            records,
            dirty: false,
        }
    }

    /// All records in identifier order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the catalog holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Binary search for `id`
    ///
    /// `Ok(i)` when `records[i]` carries `id`, `Err(i)` with the boundary
    /// index otherwise.
    fn search(&self, id: &str) -> std::result::Result<usize, usize> {
        self.records
            .binary_search_by(|rec| compare_ids(rec.sort_key(), id))
    }

    /// Position of the record with `id`
    pub fn find_index(&self, id: &str) -> Option<usize> {
        self.search(id).ok()
    }

    /// Record with `id`
    pub fn find(&self, id: &str) -> Option<&Record> {
        self.find_index(id).map(|i| &self.records[i])
    }

    /// Index at which `id` keeps the sequence sorted
    ///
    /// Every record before the returned index sorts strictly before `id`.
    /// For an id already present this is the position of that record.
    pub fn insertion_point(&self, id: &str) -> usize {
        match self.search(id) {
            Ok(i) | Err(i) => i,
        }
    }

    /// Splice a record that already carries its identifier
    ///
    /// Fails with [`Error::Conflict`] if the identifier is already present
    /// and with [`Error::InvalidInput`] if the record has no `_id`.
    pub fn insert(&mut self, record: Record) -> Result<()> {
        let id = record
            .id()
            .ok_or_else(|| Error::invalid_input("record has no _id"))?;
        match self.search(id) {
            Ok(_) => Err(Error::Conflict(format!("duplicate _id {}", id))),
            Err(at) => {
                self.records.insert(at, record);
                self.dirty = true;
                Ok(())
            }
        }
    }

    /// Replace the record whose `_id` matches `record`'s
    ///
    /// Returns `false` (and changes nothing) when the id is absent.
    pub fn replace(&mut self, record: Record) -> bool {
        let Some(idx) = record.id().and_then(|id| self.find_index(id)) else {
            return false;
        };
        self.records[idx] = record;
        self.dirty = true;
        true
    }

    /// Remove the record with `id`, keeping the rest in order
    pub fn remove(&mut self, id: &str) -> Option<Record> {
        let idx = self.find_index(id)?;
        self.dirty = true;
        Some(self.records.remove(idx))
    }

    /// Identifiers in catalog order
    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.records.iter().map(|r| RecordId::from(r.sort_key()))
    }

    /// Check the sort invariant
    pub fn is_sorted(&self) -> bool {
        self.records
            .windows(2)
            .all(|w| compare_ids(w[0].sort_key(), w[1].sort_key()).is_le())
    }

    /// Whether the catalog changed since it was last flushed
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flag the catalog as changed
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Flag the catalog as flushed
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str) -> Record {
        let mut r = Record::new();
        r.set_id(&RecordId::from(id));
        r
    }

    fn catalog(ids: &[&str]) -> Catalog {
        Catalog::from_records(ids.iter().map(|id| rec(id)).collect())
    }

    #[test]
    fn test_from_records_sorts() {
        let c = catalog(&["c", "a", "b"]);
        let ids: Vec<_> = c.ids().map(RecordId::into_string).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(c.is_sorted());
        assert!(!c.is_dirty());
    }

    #[test]
    fn test_find_index_includes_zero() {
        let c = catalog(&["a", "b", "c"]);
        assert_eq!(c.find_index("a"), Some(0));
        assert_eq!(c.find_index("c"), Some(2));
        assert_eq!(c.find_index("bb"), None);
    }

    #[test]
    fn test_insertion_point_boundaries() {
        let c = catalog(&["b", "d", "f"]);
        assert_eq!(c.insertion_point("a"), 0);
        assert_eq!(c.insertion_point("c"), 1);
        assert_eq!(c.insertion_point("e"), 2);
        assert_eq!(c.insertion_point("g"), 3);
        assert_eq!(c.insertion_point("d"), 1);
        assert_eq!(Catalog::new().insertion_point("x"), 0);
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut c = catalog(&["b", "d"]);
        c.insert(rec("c")).unwrap();
        c.insert(rec("a")).unwrap();
        c.insert(rec("e")).unwrap();
        let ids: Vec<_> = c.ids().map(RecordId::into_string).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
        assert!(c.is_dirty());
    }

    #[test]
    fn test_insert_rejects_duplicate_and_missing_id() {
        let mut c = catalog(&["a"]);
        assert!(matches!(c.insert(rec("a")), Err(Error::Conflict(_))));
        assert!(matches!(c.insert(Record::new()), Err(Error::InvalidInput(_))));
        assert_eq!(c.len(), 1);
        assert!(!c.is_dirty());
    }

    #[test]
    fn test_replace_first_record() {
        let mut c = catalog(&["a", "b"]);
        let mut updated = rec("a");
        updated.insert("name", "first");
        assert!(c.replace(updated));
        assert_eq!(
            c.find("a").unwrap().get("name").and_then(|v| v.as_str()),
            Some("first")
        );
    }

    #[test]
    fn test_replace_missing_is_noop() {
        let mut c = catalog(&["a"]);
        assert!(!c.replace(rec("z")));
        assert!(!c.replace(Record::new()));
        assert!(!c.is_dirty());
    }

    #[test]
    fn test_remove_preserves_remaining_order() {
        let mut c = catalog(&["a", "b", "c", "d"]);
        let removed = c.remove("b").unwrap();
        assert_eq!(removed.id(), Some("b"));
        let ids: Vec<_> = c.ids().map(RecordId::into_string).collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
        assert!(c.remove("b").is_none());
    }
}
