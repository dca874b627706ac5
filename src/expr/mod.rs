//! The attribute expression language.
//!
//! A small, Python-flavoured boolean language:
//!
//! ```text
//! (role == "pro") or (department == "infosec" and level >= 3)
//! "admin" in roles and team not in ("red", "blue")
//! ```
//!
//! There is no separate allow-list pass over a general syntax tree. The
//! parser only knows how to build the node kinds in [`ast::Expr`]; arithmetic,
//! calls, attribute access, slices and every other construct fail with a
//! [`GrammarError::Disallowed`] naming what was found.

mod ast;
mod eval;
mod lexer;
mod parser;
mod scope;

pub use parser::{MAX_EXPRESSION_LENGTH, MAX_NESTING_DEPTH};

use crate::error::{EvaluationError, GrammarError};
use crate::types::Attributes;

use ast::Expr;
use scope::Scope;

/// A parsed expression. Lives for a single evaluation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Expression {
    root: Expr,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self, GrammarError> {
        parser::parse(source).map(|root| Expression { root })
    }

    /// Bind the referenced attributes and reduce the tree to its truthiness.
    pub fn evaluate(&self, attributes: &Attributes) -> Result<bool, EvaluationError> {
        let scope = Scope::bind(&self.root, attributes);
        Ok(self.root.eval(&scope)?.is_truthy())
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}
