//! Query results

use catalogdb_core::Value;
use serde::{Deserialize, Serialize};

/// Reason a query failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFailure {
    /// Message from the translator or evaluator
    pub reason: String,
}

/// Result of a catalog query
///
/// Serializes as the bare array of matches, or as
/// `{"error": {"reason": "..."}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    /// Matched values in evaluation order
    Matches(Vec<Value>),
    /// The query could not be evaluated
    Error {
        /// Failure details
        error: QueryFailure,
    },
}

impl QueryOutcome {
    /// Build a failure outcome
    pub fn failure(reason: impl Into<String>) -> Self {
        QueryOutcome::Error {
            error: QueryFailure {
                reason: reason.into(),
            },
        }
    }

    /// Matches, if the query succeeded
    pub fn matches(&self) -> Option<&[Value]> {
        match self {
            QueryOutcome::Matches(m) => Some(m),
            QueryOutcome::Error { .. } => None,
        }
    }

    /// Failure reason, if the query failed
    pub fn error_reason(&self) -> Option<&str> {
        match self {
            QueryOutcome::Matches(_) => None,
            QueryOutcome::Error { error } => Some(&error.reason),
        }
    }

    /// Check if the query failed
    pub fn is_error(&self) -> bool {
        matches!(self, QueryOutcome::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_shape() {
        let outcome = QueryOutcome::failure("unexpected end");
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"error": {"reason": "unexpected end"}})
        );
        assert_eq!(outcome.error_reason(), Some("unexpected end"));
    }

    #[test]
    fn test_matches_shape() {
        let outcome = QueryOutcome::Matches(vec![Value::from("a"), Value::Int(1)]);
        assert_eq!(serde_json::to_value(&outcome).unwrap(), json!(["a", 1]));
        assert!(!outcome.is_error());
    }

    #[test]
    fn test_deserialize_both_shapes() {
        let ok: QueryOutcome = serde_json::from_value(json!([{"x": 1}])).unwrap();
        assert_eq!(ok.matches().map(<[Value]>::len), Some(1));
        let err: QueryOutcome =
            serde_json::from_value(json!({"error": {"reason": "bad"}})).unwrap();
        assert!(err.is_error());
    }
}
