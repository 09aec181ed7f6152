//! Ordering, addressing and identity under random workloads

use std::cmp::Ordering;
use std::collections::HashSet;

use catalogdb::{Catalogdb, Database, Error, Value};
use catalogdb_core::{compare_ids, UuidV4Generator};
use proptest::prelude::*;
use serde_json::json;

use crate::common::ids;

#[derive(Debug, Clone)]
enum Op {
    Insert(i64),
    Delete(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<i64>().prop_map(Op::Insert),
        1 => any::<usize>().prop_map(Op::Delete),
    ]
}

/// Random identifiers land all over the catalog
fn random_id_db() -> Catalogdb {
    Catalogdb::from_database(Database::builder().id_generator(UuidV4Generator).ephemeral())
}

fn is_sorted(ids: &[String]) -> bool {
    ids.windows(2)
        .all(|w| compare_ids(&w[0], &w[1]) == Ordering::Less)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sorted_after_every_operation(ops in prop::collection::vec(op(), 1..60)) {
        let db = random_id_db();
        for op in ops {
            match op {
                Op::Insert(v) => {
                    db.insert("c", json!({"v": v})).unwrap();
                }
                Op::Delete(pick) => {
                    let current = ids(&db, "c");
                    if !current.is_empty() {
                        db.delete_record("c", &current[pick % current.len()]).unwrap();
                    }
                }
            }
            prop_assert!(is_sorted(&ids(&db, "c")));
        }
    }

    #[test]
    fn inserted_ids_are_distinct_and_retrievable(values in prop::collection::vec(any::<i64>(), 1..40)) {
        let db = random_id_db();
        let assigned: Vec<String> = values
            .iter()
            .map(|v| db.insert("c", json!({"v": v})).unwrap())
            .collect();
        let unique: HashSet<&String> = assigned.iter().collect();
        prop_assert_eq!(unique.len(), values.len());

        for (id, v) in assigned.iter().zip(&values) {
            let found = db.find_record("c", id).unwrap().unwrap();
            prop_assert_eq!(found, Value::from(json!({"_id": id, "v": v})));
        }
        prop_assert_eq!(db.find_record("c", "absent").unwrap(), None);
    }

    #[test]
    fn delete_removes_exactly_one(count in 1usize..30, pick in any::<usize>()) {
        let db = random_id_db();
        for i in 0..count {
            db.insert("c", json!({"i": i})).unwrap();
        }
        let before = ids(&db, "c");
        let victim = before[pick % before.len()].clone();
        db.delete_record("c", &victim).unwrap();

        let expected: Vec<String> = before.into_iter().filter(|id| *id != victim).collect();
        prop_assert_eq!(ids(&db, "c"), expected);
    }

    #[test]
    fn update_preserves_identity(count in 1usize..20, pick in any::<usize>(), v in any::<i64>()) {
        let db = random_id_db();
        for i in 0..count {
            db.insert("c", json!({"i": i})).unwrap();
        }
        let before = ids(&db, "c");
        let target = before[pick % before.len()].clone();
        db.update("c", json!({"_id": target, "v": v})).unwrap();
        prop_assert_eq!(ids(&db, "c"), before);

        let missing = db.update("c", json!({"_id": "absent", "v": v}));
        let is_not_found = matches!(missing, Err(Error::RecordNotFound { .. }));
        prop_assert!(is_not_found);
    }
}
