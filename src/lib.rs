// src/lib.rs
pub use engine::evaluate_policy;
pub use error::{EvaluationError, GrammarError, PolicyError, ProviderError};
pub use expr::{MAX_EXPRESSION_LENGTH, MAX_NESTING_DEPTH};
pub use provider::{CachedProvider, HttpAttributeProvider, LmsConfig};
pub use traits::AttributeProvider;
pub use types::{AccountData, Attributes, Value};

mod engine;
mod error;
mod expr;
pub mod provider;
mod traits;
mod types;
