//! Blocking HTTP client for the LMS account endpoint.

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::traits::AttributeProvider;
use crate::types::AccountData;

use super::config::LmsConfig;

const TOKEN_HEADER: &str = "x-ctfd-token";

/// Fetches `GET {base}/account/{subject}/ctfd-data`.
#[derive(Debug, Clone)]
pub struct HttpAttributeProvider {
    client: Client,
    base_url: Url,
}

impl HttpAttributeProvider {
    pub fn new(config: &LmsConfig) -> Result<Self, ProviderError> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            ProviderError::Configuration(format!("invalid base URL {:?}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::Configuration(format!(
                "base URL {:?} cannot carry a path",
                config.base_url
            )));
        }

        let mut token = HeaderValue::from_str(&config.token)
            .map_err(|e| ProviderError::Configuration(format!("invalid token: {e}")))?;
        token.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(TOKEN_HEADER, token);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(HttpAttributeProvider { client, base_url })
    }

    /// Reads the configuration from the environment.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(&LmsConfig::from_env()?)
    }

    /// The subject is encoded as a single path segment.
    fn account_url(&self, subject: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["account", subject, "ctfd-data"]);
        }
        url
    }
}

impl AttributeProvider for HttpAttributeProvider {
    fn fetch(&self, subject: &str) -> Result<AccountData, ProviderError> {
        let url = self.account_url(subject);
        debug!(event = "Provider", phase = "Fetch", url = %url);

        let response = self.client.get(url.clone()).send().inspect_err(|e| {
            warn!(event = "Provider", phase = "Transport", url = %url, error = %e);
        })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!(event = "Provider", phase = "Status", url = %url, status = status.as_u16());
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = response.text()?;
        let data: AccountData = serde_json::from_str(&body).inspect_err(|e| {
            warn!(event = "Provider", phase = "Payload", url = %url, error = %e);
        })?;
        debug!(
            event = "Provider",
            phase = "Fetched",
            attributes = data.attributes.len(),
            active_ids = data.active_ids.len()
        );
        Ok(data)
    }
}
