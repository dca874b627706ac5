//! Variable bindings for one evaluation.

use std::collections::HashMap;

use tracing::trace;

use crate::types::{Attributes, Value};

use super::ast::Expr;

/// Private working copy of the attributes an expression refers to.
///
/// Every name in the tree is bound: present attributes are copied, absent
/// ones are bound to [`Value::Null`]. The caller's mapping is never touched.
#[derive(Debug, Default)]
pub(crate) struct Scope {
    bindings: HashMap<String, Value>,
}

impl Scope {
    pub fn bind(expr: &Expr, attributes: &Attributes) -> Self {
        let bindings = expr
            .names()
            .into_iter()
            .map(|name| {
                let value = attributes.get(name).cloned().unwrap_or_else(|| {
                    trace!(event = "Bind", attribute = name, "unknown attribute bound to None");
                    Value::Null
                });
                (name.to_string(), value)
            })
            .collect();
        Scope { bindings }
    }

    /// Never fails: unbound names read as `Null`.
    pub fn lookup(&self, name: &str) -> Value {
        self.bindings.get(name).cloned().unwrap_or_default()
    }
}
