//! REST client for the DSD search endpoint.

use std::time::Duration;

use url::Url;

use dsd_api::dataset::{parse_datasets, DatasetRecord};
use dsd_api::error::{DsdError, Result};
use dsd_api::query::{
    QueryKind, PARAM_COUNTRY_CODE, PARAM_DATA_PROVIDER_TYPE, PARAM_DATA_SET_TYPE, PARAM_QUERY_ID,
};

/// User agent string identifying this client.
const USER_AGENT: &str = concat!("dsd-client/", env!("CARGO_PKG_VERSION"));

/// Path of the search endpoint, relative to the DSD base URL.
const SEARCH_PATH: &str = "rest/search";

/// Default timeout for DSD calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the DSD REST search endpoint.
#[derive(Debug, Clone)]
pub struct DsdClient {
    http: reqwest::Client,
    base_url: String,
}

impl DsdClient {
    /// Create a client for the DSD service at `base_url` with the default
    /// timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(DsdError::Config("DSD base URL is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Query datasets by dataset type and country, returning the raw
    /// RegRep document.
    pub async fn query_raw_by_location(
        &self,
        dataset_type: &str,
        country_code: &str,
    ) -> Result<String> {
        self.query_raw(
            QueryKind::ByDatasetTypeAndLocation,
            dataset_type,
            PARAM_COUNTRY_CODE,
            country_code,
        )
        .await
    }

    /// Query datasets by dataset type and data provider type, returning
    /// the raw RegRep document.
    pub async fn query_raw_by_dp_type(&self, dataset_type: &str, dp_type: &str) -> Result<String> {
        self.query_raw(
            QueryKind::ByDatasetTypeAndDpType,
            dataset_type,
            PARAM_DATA_PROVIDER_TYPE,
            dp_type,
        )
        .await
    }

    /// Query by dataset type and country and extract the dataset records.
    /// `None` means the service's answer was not a RegRep query response.
    pub async fn query_datasets_by_location(
        &self,
        dataset_type: &str,
        country_code: &str,
    ) -> Result<Option<Vec<DatasetRecord>>> {
        let raw = self.query_raw_by_location(dataset_type, country_code).await?;
        Ok(parse_datasets(&raw))
    }

    /// Query by dataset type and data provider type and extract the
    /// dataset records.
    pub async fn query_datasets_by_dp_type(
        &self,
        dataset_type: &str,
        dp_type: &str,
    ) -> Result<Option<Vec<DatasetRecord>>> {
        let raw = self.query_raw_by_dp_type(dataset_type, dp_type).await?;
        Ok(parse_datasets(&raw))
    }

    async fn query_raw(
        &self,
        kind: QueryKind,
        dataset_type: &str,
        second_name: &str,
        second_value: &str,
    ) -> Result<String> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, SEARCH_PATH))
            .map_err(|e| DsdError::Config(format!("invalid DSD base URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair(PARAM_QUERY_ID, kind.id())
            .append_pair(PARAM_DATA_SET_TYPE, dataset_type)
            .append_pair(second_name, second_value);

        tracing::info!(url = %url, "querying DSD service");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(DsdError::DirectoryUnavailable(status.as_u16()));
        }

        let result = response.text().await?;
        tracing::debug!(bytes = result.len(), "DSD result received");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_base_url() {
        assert!(matches!(
            DsdClient::new(""),
            Err(DsdError::Config(_))
        ));
    }
}
