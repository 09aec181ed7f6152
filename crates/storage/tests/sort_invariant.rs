//! Property tests for catalog ordering
//!
//! Random sequences of inserts and deletes must leave every catalog sorted,
//! and every stored identifier must be found at the index the store reports.

use std::collections::BTreeSet;

use catalogdb_core::{IdGenerator, Record, RecordId, UuidV4Generator};
use catalogdb_storage::CatalogStore;
use parking_lot::Mutex;
use proptest::prelude::*;

/// Hands out identifiers from a pre-generated list
struct Scripted(Mutex<Vec<String>>);

impl IdGenerator for Scripted {
    fn new_id(&self) -> RecordId {
        let mut ids = self.0.lock();
        RecordId::from(ids.pop().unwrap())
    }
}

#[derive(Debug, Clone)]
enum Op {
    Insert,
    Delete(usize),
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            3 => Just(Op::Insert),
            1 => any::<usize>().prop_map(Op::Delete),
        ],
        1..80,
    )
}

proptest! {
    #[test]
    fn inserts_and_deletes_keep_catalog_sorted(ops in arb_ops()) {
        let mut store = CatalogStore::new();
        let ids = UuidV4Generator;
        let mut live: Vec<String> = Vec::new();

        for op in ops {
            match op {
                Op::Insert => {
                    let out = store.insert("c", Record::new(), &ids).unwrap();
                    live.push(out.id.into_string());
                }
                Op::Delete(n) if !live.is_empty() => {
                    let id = live.swap_remove(n % live.len());
                    prop_assert!(store.delete("c", &id));
                }
                Op::Delete(_) => {}
            }
            if let Some(catalog) = store.catalog("c") {
                prop_assert!(catalog.is_sorted());
                prop_assert_eq!(catalog.len(), live.len());
            }
        }
    }

    #[test]
    fn every_stored_id_is_found_at_its_index(
        raw in prop::collection::btree_set("[a-z0-9]{1,12}", 1..60)
    ) {
        let mut script: Vec<String> = raw.iter().cloned().collect();
        // Pop order differs from sorted order.
        script.reverse();
        let mid = script.len() / 2;
        script.rotate_left(mid);
        let ids = Scripted(Mutex::new(script));

        let mut store = CatalogStore::new();
        for _ in 0..raw.len() {
            store.insert("c", Record::new(), &ids).unwrap();
        }

        let records = store.get_catalog("c").unwrap();
        for (i, rec) in records.iter().enumerate() {
            let id = rec.id().unwrap();
            prop_assert_eq!(store.find_index_by_id("c", id), Some(i));
            prop_assert_eq!(store.find_insertion_point("c", id), i);
        }
        let stored: BTreeSet<String> =
            records.iter().map(|r| r.id().unwrap().to_string()).collect();
        prop_assert_eq!(stored, raw);
    }

    #[test]
    fn insertion_point_separates_smaller_ids(
        raw in prop::collection::btree_set("[a-z]{1,6}", 0..40),
        target in "[a-z]{1,6}",
    ) {
        let records: Vec<Record> = raw
            .iter()
            .map(|id| {
                let mut r = Record::new();
                r.insert("_id", id.as_str());
                r
            })
            .collect();
        let mut store = CatalogStore::new();
        store.load_catalog("c", records, false);

        let at = store.find_insertion_point("c", &target);
        let records = store.get_catalog("c").unwrap();
        prop_assert!(records[..at].iter().all(|r| r.sort_key() < target.as_str()));
        prop_assert!(records[at..].iter().all(|r| r.sort_key() >= target.as_str()));
    }
}
