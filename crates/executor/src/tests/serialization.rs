//! Wire shapes of Command and Output.
//!
//! Front ends exchange these as JSON, so the external shape matters more
//! than the Rust layout.

use serde_json::json;

use crate::{Command, Output, QueryOutcome, Value};

#[test]
fn test_unit_command_is_bare_string() {
    assert_eq!(serde_json::to_value(Command::Ping).unwrap(), json!("Ping"));
    let cmd: Command = serde_json::from_value(json!("ListCatalogs")).unwrap();
    assert_eq!(cmd, Command::ListCatalogs);
}

#[test]
fn test_document_is_plain_json() {
    let cmd = Command::InsertRecord {
        catalog: "widgets".into(),
        document: json!({"name": "a", "tags": [1, 2.5, null]}).into(),
    };
    assert_eq!(
        serde_json::to_value(&cmd).unwrap(),
        json!({"InsertRecord": {
            "catalog": "widgets",
            "document": {"name": "a", "tags": [1, 2.5, null]}
        }})
    );
}

#[test]
fn test_unknown_fields_rejected() {
    let result: Result<Command, _> = serde_json::from_value(json!({
        "DeleteRecord": {"catalog": "w", "id": "1", "force": true}
    }));
    assert!(result.is_err());
}

#[test]
fn test_query_output_keeps_outcome_shape() {
    let ok = Output::Query(QueryOutcome::Matches(vec![Value::from("a")]));
    assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"Query": ["a"]}));

    let failed = Output::Query(QueryOutcome::failure("unexpected end"));
    assert_eq!(
        serde_json::to_value(&failed).unwrap(),
        json!({"Query": {"error": {"reason": "unexpected end"}}})
    );
    let back: Output = serde_json::from_value(serde_json::to_value(&failed).unwrap()).unwrap();
    assert_eq!(back, failed);
}

#[test]
fn test_records_none_is_null() {
    assert_eq!(
        serde_json::to_value(Output::Records(None)).unwrap(),
        json!({"Records": null})
    );
}
