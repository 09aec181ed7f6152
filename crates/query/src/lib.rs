//! Query layer for catalogdb
//!
//! Catalog queries are path expressions in a JSPath-like syntax, evaluated
//! over the whole catalog store:
//!
//! ```text
//! .people{.age > 30 && .address.city === "Oslo"}
//! .people.[name eq "Ann" or name eq "Bob"]
//! .people[0:10]
//! ```
//!
//! This crate provides:
//! - token: tokenizer with byte spans
//! - translate: `and`/`or`/`eq`/`neq` keyword translation and catalog scoping
//! - parser: path and predicate grammar
//! - eval: the `PathEvaluator` seam and the built-in evaluator
//! - outcome: `QueryOutcome`, the never-failing query result

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod eval;
pub mod outcome;
pub mod parser;
pub mod token;
pub mod translate;

pub use error::QueryError;
pub use eval::{JsPathEvaluator, PathEvaluator};
pub use outcome::{QueryFailure, QueryOutcome};
pub use parser::{parse, parse_with_depth, Expr, Path, Selector, Step, DEFAULT_MAX_DEPTH};
pub use token::CmpOp;
pub use translate::{catalog_selector, query_catalog, rewrite_keywords, translate};
