//! Catalog queries end to end: translation, evaluation and error reporting

use catalogdb_core::{Record, SequentialIdGenerator, Value};
use catalogdb_query::{
    query_catalog, rewrite_keywords, JsPathEvaluator, PathEvaluator, QueryError, QueryOutcome,
};
use catalogdb_storage::CatalogStore;
use proptest::prelude::*;

fn widgets() -> CatalogStore {
    let mut store = CatalogStore::new();
    let ids = SequentialIdGenerator::default();
    for (name, size) in [("a", 1), ("b", 2), ("a", 3), ("c and d", 4)] {
        let mut r = Record::new();
        r.insert("name", name);
        r.insert("size", size);
        store.insert("widgets", r, &ids).unwrap();
    }
    store
}

fn names(outcome: &QueryOutcome) -> Vec<String> {
    outcome
        .matches()
        .unwrap()
        .iter()
        .map(|v| {
            v.as_object()
                .and_then(|o| o.get("name"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

#[test]
fn keyword_filter_returns_only_matching_records() {
    let store = widgets();
    let outcome = query_catalog(&store, "widgets", r#".[name eq "a"]"#, &JsPathEvaluator::new());
    assert_eq!(names(&outcome), vec!["a", "a"]);
}

#[test]
fn combined_keywords() {
    let store = widgets();
    let outcome = query_catalog(
        &store,
        "widgets",
        r#"{.name eq "a" and .size neq 1 or .name eq "b"}"#,
        &JsPathEvaluator::new(),
    );
    assert_eq!(names(&outcome), vec!["b", "a"]);
}

#[test]
fn keyword_inside_literal_matches_literally() {
    let store = widgets();
    let outcome = query_catalog(
        &store,
        "widgets",
        r#"{.name eq "c and d"}"#,
        &JsPathEvaluator::new(),
    );
    assert_eq!(names(&outcome), vec!["c and d"]);
}

#[test]
fn empty_filter_returns_whole_catalog() {
    let store = widgets();
    let outcome = query_catalog(&store, "widgets", "", &JsPathEvaluator::new());
    assert_eq!(outcome.matches().map(<[Value]>::len), Some(4));
}

#[test]
fn missing_catalog_is_empty_not_error() {
    let store = widgets();
    let outcome = query_catalog(&store, "nope", r#"{.name eq "a"}"#, &JsPathEvaluator::new());
    assert_eq!(outcome, QueryOutcome::Matches(vec![]));
}

#[test]
fn malformed_filter_is_structured_error() {
    let store = widgets();
    for bad in [r#"{.name eq "a""#, "{.name eq}", "{.name = 1}", r#"{.name eq "open}"#] {
        let outcome = query_catalog(&store, "widgets", bad, &JsPathEvaluator::new());
        assert!(outcome.is_error(), "expected error for {bad}");
        assert!(!outcome.error_reason().unwrap().is_empty());
    }
}

#[test]
fn custom_evaluator_errors_are_reported() {
    struct Refuse;
    impl PathEvaluator for Refuse {
        fn evaluate(&self, _: &str, _: &CatalogStore) -> Result<Vec<Value>, QueryError> {
            Err(QueryError::Evaluation("type mismatch".into()))
        }
    }

    let outcome = query_catalog(&widgets(), "widgets", "", &Refuse);
    assert_eq!(outcome, QueryOutcome::failure("type mismatch"));
}

#[test]
fn evaluator_sees_scoped_expression() {
    use std::sync::Mutex;

    struct Capture(Mutex<Vec<String>>);
    impl PathEvaluator for Capture {
        fn evaluate(&self, expr: &str, _: &CatalogStore) -> Result<Vec<Value>, QueryError> {
            self.0.lock().unwrap().push(expr.to_string());
            Ok(vec![])
        }
    }

    let capture = Capture(Mutex::new(Vec::new()));
    query_catalog(&widgets(), "widgets", r#"{.a eq 1 or .b neq "x"}"#, &capture);
    assert_eq!(
        capture.0.lock().unwrap().as_slice(),
        [r#".widgets{.a === 1 || .b !== "x"}"#]
    );
}

proptest! {
    #[test]
    fn string_literals_survive_rewriting(text in "[a-z ]{0,24}") {
        let escaped = text.replace('"', "");
        let filter = format!(r#"{{.name eq "{}"}}"#, escaped);
        let rewritten = rewrite_keywords(&filter).unwrap();
        prop_assert_eq!(rewritten, format!(r#"{{.name === "{}"}}"#, escaped));
    }

    #[test]
    fn rewriting_is_idempotent(words in prop::collection::vec(
        prop::sample::select(vec![".a", ".b", "and", "or", "eq", "neq", "1", "\"s\"", "(", ")"]),
        0..16,
    )) {
        let filter = words.join(" ");
        if let Ok(once) = rewrite_keywords(&filter) {
            prop_assert_eq!(rewrite_keywords(&once).unwrap(), once.clone());
            prop_assert!(!once.split_whitespace().any(|w| matches!(w, "and" | "or" | "eq" | "neq")));
        }
    }
}
