//! Attribute providers: where the attributes handed to
//! [`crate::evaluate_policy`] come from.
//!
//! ```rust,no_run
//! use attrgate_core::{evaluate_policy, AttributeProvider, CachedProvider, HttpAttributeProvider};
//!
//! let provider = CachedProvider::new(HttpAttributeProvider::from_env()?);
//! let account = provider.fetch("alice@example.com")?;
//! let allowed = evaluate_policy(r#"role == "pro""#, &account.attributes);
//! # Ok::<(), attrgate_core::ProviderError>(())
//! ```

mod cache;
mod config;
mod http;

pub use cache::{CachedProvider, DEFAULT_TTL};
pub use config::{BASE_URL_VAR, DEFAULT_TIMEOUT, LmsConfig, TOKEN_VAR};
pub use http::HttpAttributeProvider;
