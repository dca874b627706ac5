//! Tree-walking evaluator.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::EvaluationError;
use crate::types::Value;

use super::ast::{BoolOp, CompareOp, Expr};
use super::scope::Scope;

impl Expr {
    /// Evaluate against a bound scope.
    ///
    /// `and`/`or` short-circuit and yield the deciding operand rather than a
    /// bool, so `(nickname or "anon") == "anon"` works as expected.
    pub fn eval(&self, scope: &Scope) -> Result<Value, EvaluationError> {
        match self {
            Expr::BoolOp { op, operands } => {
                let mut last = Value::Null;
                for operand in operands {
                    let value = operand.eval(scope)?;
                    let decided = match op {
                        BoolOp::And => !value.is_truthy(),
                        BoolOp::Or => value.is_truthy(),
                    };
                    if decided {
                        return Ok(value);
                    }
                    last = value;
                }
                Ok(last)
            }
            Expr::Not(inner) => Ok(Value::Bool(!inner.eval(scope)?.is_truthy())),
            Expr::Compare { left, chain } => {
                let mut left = left.eval(scope)?;
                for (op, right) in chain {
                    let right = right.eval(scope)?;
                    if !compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            Expr::Name(name) => Ok(scope.lookup(name)),
            Expr::Constant(value) => Ok(value.clone()),
            Expr::List(items) | Expr::Tuple(items) => items
                .iter()
                .map(|item| item.eval(scope))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Expr::Map(entries) => {
                let mut map = BTreeMap::new();
                for (key, value) in entries {
                    let key = match key.eval(scope)? {
                        Value::String(key) => key,
                        other => {
                            return Err(EvaluationError::NonStringKey(
                                other.type_name().to_string(),
                            ));
                        }
                    };
                    map.insert(key, value.eval(scope)?);
                }
                Ok(Value::Map(map))
            }
            Expr::Subscript { target, index } => target.eval(scope)?.index(&index.eval(scope)?),
        }
    }
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, EvaluationError> {
    let symbol = op.to_string();
    Ok(match op {
        CompareOp::Eq => left == right,
        CompareOp::NotEq => left != right,
        CompareOp::Lt => left.try_cmp(right, &symbol)? == Ordering::Less,
        CompareOp::LtE => left.try_cmp(right, &symbol)? != Ordering::Greater,
        CompareOp::Gt => left.try_cmp(right, &symbol)? == Ordering::Greater,
        CompareOp::GtE => left.try_cmp(right, &symbol)? != Ordering::Less,
        CompareOp::In => right.contains(left)?,
        CompareOp::NotIn => !right.contains(left)?,
    })
}
