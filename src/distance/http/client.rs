//! Shared blocking HTTP plumbing for road-network providers.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use crate::error::ProviderError;

/// Default user agent for provider requests.
pub const DEFAULT_USER_AGENT: &str = "fleet-routing/0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Failure to construct an HTTP provider.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Connection settings shared by the HTTP providers.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpProviderConfig {
    /// Service root, e.g. `"https://maps.googleapis.com"`.
    pub base_url: String,
    /// Connect and request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Largest number of origins (and of destinations) per request.
    pub max_locations_per_side: usize,
}

impl HttpProviderConfig {
    /// Configuration for the given service root.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_locations_per_side: 25,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-request location limit (at least 1).
    #[must_use]
    pub fn with_max_locations_per_side(mut self, limit: usize) -> Self {
        self.max_locations_per_side = limit.max(1);
        self
    }

    /// `base_url` joined with `path`, without a doubled slash.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

/// A reqwest client driven synchronously.
///
/// Outside any Tokio runtime, or inside a `current_thread` one, requests run
/// on a private current-thread runtime. Inside a multi-threaded runtime the
/// caller's handle is used through `block_in_place`.
pub(crate) struct BlockingClient {
    client: Client,
    runtime: Runtime,
}

impl std::fmt::Debug for BlockingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingClient")
            .field("client", &self.client)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl BlockingClient {
    pub(crate) fn new(config: &HttpProviderConfig) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self { client, runtime })
    }

    /// GETs `url` with `query` and decodes the JSON body.
    pub(crate) fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let future = async {
            let response = self
                .client
                .get(url)
                .query(query)
                .send()
                .await
                .map_err(|err| convert_reqwest_error(&err, url))?
                .error_for_status()
                .map_err(|err| convert_reqwest_error(&err, url))?;
            response
                .json::<T>()
                .await
                .map_err(|err| ProviderError::Parse(err.to_string()))
        };
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

fn convert_reqwest_error(error: &reqwest::Error, url: &str) -> ProviderError {
    if let Some(status) = error.status() {
        return ProviderError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
        };
    }
    let message = if error.is_timeout() {
        "request timed out".to_owned()
    } else {
        error.to_string()
    };
    ProviderError::Network {
        url: url.to_owned(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = HttpProviderConfig::new("http://example.com/")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("test-agent/1.0")
            .with_max_locations_per_side(0);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(config.max_locations_per_side, 1);
        assert_eq!(config.endpoint("/table/v1"), "http://example.com/table/v1");
    }

    #[test]
    fn test_client_builds() {
        let client = BlockingClient::new(&HttpProviderConfig::new("http://localhost"));
        assert!(client.is_ok());
    }
}
