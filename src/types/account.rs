//! Attribute payload returned by the identity service for one subject.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::value::{Attributes, Value};

/// Attributes and active identifiers for one subject.
///
/// Wire form:
/// ```json
/// { "attributes": { "role": "pro" }, "active_attempt_task_ids": [1, 2] }
/// ```
/// A missing field, or one holding any falsy JSON value (`null`, `false`,
/// `0`, `""`, `[]`, `{}`), is empty. A truthy value of the wrong shape is
/// rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AccountData {
    #[serde(default, deserialize_with = "falsy_as_default")]
    #[schema(value_type = Object)]
    pub attributes: Attributes,
    #[serde(
        rename = "active_attempt_task_ids",
        default,
        deserialize_with = "falsy_as_default"
    )]
    pub active_ids: Vec<i64>,
}

impl AccountData {
    pub fn new(attributes: Attributes) -> Self {
        AccountData {
            attributes,
            active_ids: Vec::new(),
        }
    }

    pub fn with_active_ids(mut self, ids: Vec<i64>) -> Self {
        self.active_ids = ids;
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }
}

fn falsy_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let falsy = match &raw {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(a) => a.is_empty(),
        serde_json::Value::Object(o) => o.is_empty(),
    };
    if falsy {
        return Ok(T::default());
    }
    serde_json::from_value(raw).map_err(D::Error::custom)
}
