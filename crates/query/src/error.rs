//! Query errors
//!
//! Positions are byte offsets into the text being tokenized or parsed.

use thiserror::Error;

/// Error raised while tokenizing, parsing or evaluating a query
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Character that starts no token
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),

    /// String literal without closing quote
    #[error("unterminated string starting at position {0}")]
    UnterminatedString(usize),

    /// Malformed escape sequence inside a string literal
    #[error("invalid escape sequence at position {0}")]
    InvalidEscape(usize),

    /// Number literal that does not parse
    #[error("invalid number '{1}' at position {0}")]
    InvalidNumber(usize, String),

    /// Token the grammar does not allow here
    #[error("unexpected '{1}' at position {0}")]
    UnexpectedToken(usize, String),

    /// Expression ended early
    #[error("unexpected end of expression, expected {0}")]
    UnexpectedEnd(&'static str),

    /// Expression nests deeper than allowed
    #[error("expression nesting exceeds maximum depth of {0}")]
    TooDeep(usize),

    /// Failure reported by a custom evaluator
    #[error("{0}")]
    Evaluation(String),
}
