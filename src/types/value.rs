//! Dynamically typed attribute values.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::EvaluationError;

/// Attribute mapping for one subject, keyed by attribute name.
pub type Attributes = HashMap<String, Value>;

/// A value an attribute or a literal can hold.
///
/// Deserializes straight from JSON: `null`, booleans, numbers, strings,
/// arrays and objects map onto the variants of the same shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    #[schema(no_recursion)]
    List(Vec<Value>),
    #[schema(no_recursion)]
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Empty-like values are false, all else true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(xs) => !xs.is_empty(),
            Value::Map(m) => !m.is_empty(),
        }
    }

    /// Ordering for `<`, `<=`, `>`, `>=`.
    ///
    /// Only same-variant pairs of numbers, strings, bools and lists are
    /// ordered; everything else, `Null` included, is an error.
    pub fn try_cmp(&self, other: &Value, op: &str) -> Result<Ordering, EvaluationError> {
        let ordering = match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    if x != y {
                        return x.try_cmp(y, op);
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            _ => None,
        };
        ordering.ok_or_else(|| EvaluationError::Unorderable {
            op: op.to_string(),
            left: self.type_name().to_string(),
            right: other.type_name().to_string(),
        })
    }

    /// Membership test for `needle in self`.
    pub fn contains(&self, needle: &Value) -> Result<bool, EvaluationError> {
        match self {
            Value::List(xs) => Ok(xs.contains(needle)),
            Value::Map(m) => match needle {
                Value::String(k) => Ok(m.contains_key(k)),
                Value::List(_) | Value::Map(_) => Err(EvaluationError::Unhashable(
                    needle.type_name().to_string(),
                )),
                _ => Ok(false),
            },
            Value::String(haystack) => match needle {
                Value::String(s) => Ok(haystack.contains(s.as_str())),
                other => Err(EvaluationError::NonStringNeedle(
                    other.type_name().to_string(),
                )),
            },
            other => Err(EvaluationError::NotACollection(
                other.type_name().to_string(),
            )),
        }
    }

    /// Subscript access `self[index]`.
    pub fn index(&self, index: &Value) -> Result<Value, EvaluationError> {
        match self {
            Value::List(xs) => {
                let pos = sequence_position(index, xs.len(), "list")?;
                Ok(xs[pos].clone())
            }
            Value::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                let pos = sequence_position(index, chars.len(), "string")?;
                Ok(Value::String(chars[pos].to_string()))
            }
            Value::Map(m) => match index {
                Value::String(key) => m
                    .get(key)
                    .cloned()
                    .ok_or_else(|| EvaluationError::MissingKey(key.clone())),
                other => Err(EvaluationError::InvalidIndex {
                    container: "map".to_string(),
                    expected: "strings".to_string(),
                    found: other.type_name().to_string(),
                }),
            },
            other => Err(EvaluationError::NotSubscriptable(
                other.type_name().to_string(),
            )),
        }
    }
}

/// Resolve an integral, possibly negative, index against a sequence of `len`.
fn sequence_position(index: &Value, len: usize, container: &str) -> Result<usize, EvaluationError> {
    let n = match index {
        Value::Number(n) if n.fract() == 0.0 => *n as i64,
        other => {
            return Err(EvaluationError::InvalidIndex {
                container: container.to_string(),
                expected: "integers".to_string(),
                found: other.type_name().to_string(),
            });
        }
    };
    let len = len as i64;
    let pos = if n < 0 { n + len } else { n };
    if (0..len).contains(&pos) {
        Ok(pos as usize)
    } else {
        Err(EvaluationError::IndexOutOfRange {
            container: container.to_string(),
            index: n,
        })
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Value::Null => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::List(xs) => write!(f, "[{}]", xs.iter().join(", ")),
            Value::Map(m) => write!(
                f,
                "{{{}}}",
                m.iter().map(|(k, v)| format!("{k:?}: {v}")).join(", ")
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(xs: Vec<T>) -> Self {
        Value::List(xs.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        null = { Value::Null, false },
        false_ = { Value::Bool(false), false },
        true_ = { Value::Bool(true), true },
        zero = { Value::Number(0.0), false },
        negative = { Value::Number(-1.0), true },
        empty_string = { Value::from(""), false },
        string = { Value::from("x"), true },
        empty_list = { Value::List(vec![]), false },
        list = { Value::from(vec![0]), true },
        empty_map = { Value::Map(BTreeMap::new()), false },
    )]
    fn test_truthiness(value: Value, expected: bool) {
        assert_eq!(value.is_truthy(), expected);
    }

    #[test]
    fn test_cmp_same_types() {
        assert_eq!(
            Value::from(2).try_cmp(&Value::from(3.5), "<").unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Value::from("b").try_cmp(&Value::from("a"), ">").unwrap(),
            Ordering::Greater
        );
        assert_eq!(
            Value::from(false).try_cmp(&Value::from(true), "<").unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Value::from(vec![1, 2])
                .try_cmp(&Value::from(vec![1, 2, 0]), "<")
                .unwrap(),
            Ordering::Less
        );
    }

    #[parameterized(
        number_string = { Value::from(3), Value::from("3") },
        null_null = { Value::Null, Value::Null },
        null_number = { Value::Null, Value::from(1) },
        bool_number = { Value::from(true), Value::from(1) },
        list_elements = { Value::from(vec![Value::from(1)]), Value::from(vec![Value::from("a")]) },
    )]
    fn test_cmp_mismatched_types_errors(left: Value, right: Value) {
        assert!(matches!(
            left.try_cmp(&right, "<"),
            Err(EvaluationError::Unorderable { .. })
        ));
    }

    #[test]
    fn test_equality_never_crosses_variants() {
        assert_ne!(Value::from(true), Value::from(1));
        assert_ne!(Value::Null, Value::from(""));
        assert_eq!(Value::Null, Value::Null);
        assert_eq!(Value::from(1), Value::from(1.0));
    }

    #[test]
    fn test_contains() {
        let roles = Value::from(vec!["user", "admin"]);
        assert!(roles.contains(&Value::from("admin")).unwrap());
        assert!(!roles.contains(&Value::from("root")).unwrap());
        assert!(Value::from("infosec").contains(&Value::from("sec")).unwrap());

        let map: Value = serde_json::from_str(r#"{"a": 1}"#).unwrap();
        assert!(map.contains(&Value::from("a")).unwrap());
        assert!(!map.contains(&Value::from(1)).unwrap());
    }

    #[test]
    fn test_contains_rejects_non_collections() {
        assert_eq!(
            Value::Null.contains(&Value::from("x")),
            Err(EvaluationError::NotACollection("null".to_string()))
        );
        assert_eq!(
            Value::from("abc").contains(&Value::from(1)),
            Err(EvaluationError::NonStringNeedle("number".to_string()))
        );
    }

    #[test]
    fn test_map_membership_of_unhashable_errors() {
        let map: Value = serde_json::from_str(r#"{"a": 1}"#).unwrap();
        assert_eq!(
            map.contains(&Value::from(vec![1])),
            Err(EvaluationError::Unhashable("list".to_string()))
        );
        assert_eq!(
            map.contains(&map),
            Err(EvaluationError::Unhashable("map".to_string()))
        );
        assert!(!map.contains(&Value::Null).unwrap());
    }

    #[test]
    fn test_index() {
        let xs = Value::from(vec!["a", "b", "c"]);
        assert_eq!(xs.index(&Value::from(0)).unwrap(), Value::from("a"));
        assert_eq!(xs.index(&Value::from(-1)).unwrap(), Value::from("c"));
        assert!(matches!(
            xs.index(&Value::from(3)),
            Err(EvaluationError::IndexOutOfRange { index: 3, .. })
        ));
        assert!(matches!(
            xs.index(&Value::from(0.5)),
            Err(EvaluationError::InvalidIndex { .. })
        ));
        assert_eq!(
            Value::from("héllo").index(&Value::from(1)).unwrap(),
            Value::from("é")
        );
        assert_eq!(
            Value::from(1).index(&Value::from(0)),
            Err(EvaluationError::NotSubscriptable("number".to_string()))
        );
    }

    #[test]
    fn test_deserialize_from_json() {
        let value: Value =
            serde_json::from_str(r#"{"level": 3, "roles": ["a"], "x": null, "ok": true}"#)
                .unwrap();
        let Value::Map(m) = value else {
            panic!("expected map");
        };
        assert_eq!(m["level"], Value::Number(3.0));
        assert_eq!(m["roles"], Value::from(vec!["a"]));
        assert_eq!(m["x"], Value::Null);
        assert_eq!(m["ok"], Value::Bool(true));
    }

    #[test]
    fn test_serialize_snapshot() {
        let value = Value::from(vec![Value::from("user"), Value::Null, Value::from(true)]);
        insta::assert_json_snapshot!(value, @r#"
        [
          "user",
          null,
          true
        ]
        "#);
    }

    #[test]
    fn test_display() {
        let value = Value::from(vec![Value::from("a"), Value::Null, Value::from(2.5)]);
        assert_eq!(value.to_string(), r#"["a", None, 2.5]"#);
    }
}
