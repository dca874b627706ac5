//! Connection settings for the remote attribute service.

use std::time::Duration;

use crate::error::ProviderError;

/// Environment variable holding the service base URL.
pub const BASE_URL_VAR: &str = "LMS_BASE_URL";

/// Environment variable holding the shared access token.
pub const TOKEN_VAR: &str = "LMS_CTFD_TOKEN";

/// Request timeout used unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, PartialEq, Eq)]
pub struct LmsConfig {
    pub base_url: String,
    pub token: String,
    pub timeout: Duration,
}

impl LmsConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        LmsConfig {
            base_url: base_url.into(),
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read [`BASE_URL_VAR`] and [`TOKEN_VAR`] from the process environment.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ProviderError> {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        match (read(BASE_URL_VAR), read(TOKEN_VAR)) {
            (Some(base_url), Some(token)) => Ok(LmsConfig::new(base_url, token)),
            _ => Err(ProviderError::Configuration(format!(
                "LMS is not configured ({BASE_URL_VAR}/{TOKEN_VAR})"
            ))),
        }
    }
}

// The token stays out of logs.
impl std::fmt::Debug for LmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmsConfig")
            .field("base_url", &self.base_url)
            .field("token", &"[redacted]")
            .field("timeout", &self.timeout)
            .finish()
    }
}
