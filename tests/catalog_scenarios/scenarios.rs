//! Basic flows, one per public operation

use catalogdb::{Catalogdb, Error, Value};
use serde_json::json;

use crate::common::{id_of, seq_db};

#[test]
fn insert_into_new_catalog() {
    let db = Catalogdb::ephemeral();
    let id = db.insert("widgets", json!({"name": "a"})).unwrap();
    assert!(!id.is_empty());

    let records = db.get_catalog("widgets").unwrap().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], Value::from(json!({"_id": id, "name": "a"})));
}

#[test]
fn find_returns_exact_record_not_neighbors() {
    let db = Catalogdb::ephemeral();
    let ids: Vec<String> = ["first", "second", "third"]
        .iter()
        .map(|n| db.insert("widgets", json!({"name": n})).unwrap())
        .collect();

    let found = db.find_record("widgets", &ids[1]).unwrap().unwrap();
    assert_eq!(id_of(&found), ids[1]);
    assert_eq!(found.as_object().unwrap().get("name"), Some(&Value::from("second")));
}

#[test]
fn delete_unknown_id_is_not_found() {
    let db = seq_db();
    db.insert("widgets", json!({"name": "a"})).unwrap();
    let before = db.get_catalog("widgets").unwrap();

    let err = db.delete_record("widgets", "no-such-id").unwrap_err();
    assert!(matches!(err, Error::RecordNotFound { .. }));
    assert_eq!(db.get_catalog("widgets").unwrap(), before);
}

#[test]
fn keyword_query_returns_only_matches() {
    let db = seq_db();
    for name in ["a", "b", "a", "c"] {
        db.insert("widgets", json!({"name": name})).unwrap();
    }
    let outcome = db.query("widgets", r#".[name eq "a"]"#).unwrap();
    let matches = outcome.matches().unwrap();
    assert_eq!(matches.len(), 2);
    assert!(matches
        .iter()
        .all(|m| m.as_object().unwrap().get("name") == Some(&Value::from("a"))));
}

#[test]
fn deleted_catalog_is_absent() {
    let db = seq_db();
    db.insert("widgets", json!({"name": "a"})).unwrap();
    assert!(db.delete_catalog("widgets").unwrap());
    assert_eq!(db.get_catalog("widgets").unwrap(), None);
    assert!(db.list_catalogs().unwrap().is_empty());
}

#[test]
fn malformed_query_is_structured_error() {
    let db = seq_db();
    db.insert("widgets", json!({"name": "a"})).unwrap();
    let outcome = db.query("widgets", r#".[name eq "a""#).unwrap();
    assert!(outcome.is_error());
    let wire = serde_json::to_value(&outcome).unwrap();
    assert!(wire["error"]["reason"].is_string());
}

#[test]
fn update_first_record() {
    let db = seq_db();
    let first = db.insert("widgets", json!({"name": "a", "size": 1})).unwrap();
    db.insert("widgets", json!({"name": "b"})).unwrap();

    db.update("widgets", json!({"_id": first, "size": 2})).unwrap();
    let stored = db.find_record("widgets", &first).unwrap().unwrap();
    assert_eq!(stored, Value::from(json!({"_id": first, "name": "a", "size": 2})));
}

#[test]
fn update_without_id_is_invalid() {
    let db = seq_db();
    let err = db.update("widgets", json!({"name": "x"})).unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[test]
fn rest_front_end_flow() {
    let db = seq_db();
    let path = "/v1/catalogs/widgets";
    let created = catalogdb::rest::handle(db.executor(), "POST", path, "", Some(r#"{"name":"a"}"#));
    assert_eq!(created.status, 201);

    let listed = catalogdb::rest::handle(db.executor(), "GET", path, "", None);
    assert_eq!(listed.body["result"].as_array().map(Vec::len), Some(1));

    let bad = catalogdb::rest::handle(db.executor(), "OPTIONS", path, "", None);
    assert_eq!(bad.status, 501);
}
