//! Data model: attribute values and the per-subject payload.
//!
//! Attribute values are a closed set of JSON-shaped variants; see [`Value`]
//! for truthiness, ordering and membership rules.

mod account;
mod value;

pub use account::AccountData;
pub use value::{Attributes, Value};
