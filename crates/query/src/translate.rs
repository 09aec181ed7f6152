//! Filter translation
//!
//! Filters are written with a small word vocabulary and translated to the
//! evaluator's operator tokens before evaluation:
//!
//! | Word  | Operator |
//! |-------|----------|
//! | `and` | `&&`     |
//! | `or`  | `\|\|`   |
//! | `eq`  | `===`    |
//! | `neq` | `!==`    |
//!
//! Translation works on tokens, not text: a word inside a string literal,
//! or directly after `.` (a field called `or`), is left alone. The
//! translated filter is appended to a selector for the catalog and the
//! whole expression is evaluated against the store.

use catalogdb_storage::CatalogStore;
use tracing::debug;

use crate::error::QueryError;
use crate::eval::PathEvaluator;
use crate::outcome::QueryOutcome;
use crate::token::{is_ident_continue, is_ident_start, tokenize, TokenKind};

fn keyword_operator(word: &str) -> Option<&'static str> {
    match word {
        "and" => Some("&&"),
        "or" => Some("||"),
        "eq" => Some("==="),
        "neq" => Some("!=="),
        _ => None,
    }
}

/// Replace keyword tokens in `filter` with operator tokens
///
/// All other text, whitespace included, is kept as written.
pub fn rewrite_keywords(filter: &str) -> Result<String, QueryError> {
    let tokens = tokenize(filter)?;
    let mut out = String::with_capacity(filter.len() + 8);
    let mut copied = 0;
    let mut prev: Option<&TokenKind> = None;

    for token in &tokens {
        let after_dot = matches!(prev, Some(TokenKind::Dot) | Some(TokenKind::DotDot));
        if let TokenKind::Ident(word) = &token.kind {
            if let Some(op) = keyword_operator(word).filter(|_| !after_dot) {
                out.push_str(&filter[copied..token.span.start]);
                out.push_str(op);
                copied = token.span.end;
            }
        }
        prev = Some(&token.kind);
    }
    out.push_str(&filter[copied..]);
    Ok(out)
}

/// Selector for a catalog at the root of the store
///
/// Names that are not bare words are quoted.
pub fn catalog_selector(catalog: &str) -> String {
    let mut chars = catalog.chars();
    let bare = chars.next().is_some_and(is_ident_start) && chars.all(is_ident_continue);
    if bare {
        format!(".{}", catalog)
    } else {
        let escaped = catalog.replace('\\', "\\\\").replace('"', "\\\"");
        format!(".\"{}\"", escaped)
    }
}

/// Full expression for `filter` scoped to `catalog`
pub fn translate(catalog: &str, filter: &str) -> Result<String, QueryError> {
    Ok(format!("{}{}", catalog_selector(catalog), rewrite_keywords(filter)?))
}

/// Translate `filter` and evaluate it against `store`
///
/// Never fails: translation and evaluation errors come back as
/// [`QueryOutcome::Error`].
pub fn query_catalog(
    store: &CatalogStore,
    catalog: &str,
    filter: &str,
    evaluator: &dyn PathEvaluator,
) -> QueryOutcome {
    let result =
        translate(catalog, filter).and_then(|expr| evaluator.evaluate(&expr, store));
    match result {
        Ok(matches) => {
            debug!(target: "catalogdb::query", catalog, filter, matches = matches.len(), "Query evaluated");
            QueryOutcome::Matches(matches)
        }
        Err(e) => {
            debug!(target: "catalogdb::query", catalog, filter, error = %e, "Query failed");
            QueryOutcome::failure(e.to_string())
        }
    }
}
