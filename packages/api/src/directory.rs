//! HTTP client for the Directory search API.

use std::time::Duration;

use url::Url;

use crate::error::{DsdError, Result};

/// User agent string identifying this service.
const USER_AGENT: &str = concat!("dsd-api/", env!("CARGO_PKG_VERSION"));

/// Path of the search endpoint, relative to the directory base URL.
const SEARCH_PATH: &str = "search/1.0/xml";

/// Records requested per search call. The directory rejects values above
/// 1000.
const RESULTS_PER_CALL: u32 = 100;

/// Identifier scheme under which the directory registers provider types.
pub const DP_TYPE_IDENTIFIER_SCHEME: &str = "DataProviderType";

/// Default timeout for directory calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for a [`DirectoryClient`].
#[derive(Debug, Clone)]
pub struct DirectoryClientConfig {
    /// Timeout for the whole request, connect included.
    pub timeout: Duration,
    /// Skip TLS certificate verification on the outbound connection.
    /// Off by default; enable only deliberately, for test directories
    /// running on self-signed certificates.
    pub accept_invalid_certs: bool,
}

impl Default for DirectoryClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            accept_invalid_certs: false,
        }
    }
}

/// Client for the directory's search API.
///
/// Every search requests up to [`RESULTS_PER_CALL`] records and expects an
/// XML result list back. Any non-200 answer is a fetch failure; the
/// pipeline does not retry.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl DirectoryClient {
    /// Create a client for the directory at `base_url`.
    pub fn new(base_url: impl Into<String>, config: &DirectoryClientConfig) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(DsdError::Config("directory base URL is empty".to_string()));
        }
        if config.accept_invalid_certs {
            tracing::warn!("TLS certificate verification is disabled for directory calls");
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search the directory, optionally narrowed to one country.
    pub async fn search_by_country(&self, country_code: Option<&str>) -> Result<String> {
        let mut url = self.search_url()?;
        if let Some(country) = country_code {
            if !country.is_empty() {
                url.query_pairs_mut().append_pair("country", country);
            }
        }
        self.call_search(url).await
    }

    /// Search the directory for participants of one data provider type.
    pub async fn search_by_dp_type(&self, dp_type: &str) -> Result<String> {
        let mut url = self.search_url()?;
        url.query_pairs_mut()
            .append_pair("identifierScheme", DP_TYPE_IDENTIFIER_SCHEME)
            .append_pair("identifierValue", dp_type);
        self.call_search(url).await
    }

    fn search_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, SEARCH_PATH))
            .map_err(|e| DsdError::Config(format!("invalid directory base URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("rpc", &RESULTS_PER_CALL.to_string());
        Ok(url)
    }

    async fn call_search(&self, url: Url) -> Result<String> {
        tracing::info!(url = %url, "querying directory");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(DsdError::DirectoryUnavailable(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_base_url() {
        let result = DirectoryClient::new("", &DirectoryClientConfig::default());
        assert!(matches!(result, Err(DsdError::Config(_))));
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let client = DirectoryClient::new(
            "https://directory.example.org/",
            &DirectoryClientConfig::default(),
        )
        .unwrap();
        let url = client.search_url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://directory.example.org/search/1.0/xml?rpc=100"
        );
    }
}
