use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error for a single expression evaluation.
///
/// Never crosses the public boundary of [`crate::evaluate_policy`]; it is
/// logged and turned into a deny there.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum PolicyError {
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),

    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),
}

/// The expression could not be parsed, or used a construct outside the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GrammarError {
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("line break outside brackets at offset {0}")]
    LineBreak(usize),

    #[error("unterminated string literal starting at offset {0}")]
    UnterminatedString(usize),

    #[error("invalid escape sequence at offset {0}")]
    InvalidEscape(usize),

    #[error("invalid number literal {literal:?} at offset {offset}")]
    InvalidNumber { literal: String, offset: usize },

    #[error("unexpected {found} at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        offset: usize,
    },

    #[error("unexpected end of expression, expected {0}")]
    UnexpectedEnd(String),

    #[error("disallowed expression: {construct} at offset {offset}")]
    Disallowed { construct: String, offset: usize },

    #[error("expression is {len} bytes, limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error("expression nesting exceeds {max} levels")]
    TooDeep { max: usize },
}

/// A runtime fault while evaluating a well-formed expression.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum EvaluationError {
    #[error("'{op}' not supported between {left} and {right}")]
    Unorderable {
        op: String,
        left: String,
        right: String,
    },

    #[error("argument of type {0} is not a collection")]
    NotACollection(String),

    #[error("'in <string>' requires string as left operand, not {0}")]
    NonStringNeedle(String),

    #[error("{container} indices must be {expected}, not {found}")]
    InvalidIndex {
        container: String,
        expected: String,
        found: String,
    },

    #[error("{container} index {index} out of range")]
    IndexOutOfRange { container: String, index: i64 },

    #[error("key {0:?} not found")]
    MissingKey(String),

    #[error("{0} is not subscriptable")]
    NotSubscriptable(String),

    #[error("mapping keys must be strings, not {0}")]
    NonStringKey(String),

    #[error("unhashable type: {0}")]
    Unhashable(String),
}

/// Failure to obtain attributes from the remote identity service.
///
/// Every variant means "unavailable" to the caller; the core never sees these.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ProviderError {
    #[error("attribute provider is not configured: {0}")]
    Configuration(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("attribute provider returned status {0}")]
    Status(u16),

    #[error("invalid attribute payload: {0}")]
    InvalidPayload(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::InvalidPayload(err.to_string())
    }
}
