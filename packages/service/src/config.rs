use std::time::Duration;

use dsd_api::directory::DEFAULT_TIMEOUT_SECS;
use dsd_api::error::{DsdError, Result};

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the directory this service bridges to.
    pub directory_url: String,
    pub bind_addr: String,
    pub http_timeout: Duration,
    /// Skip TLS verification on directory calls. Off unless explicitly
    /// enabled; meant for test directories on self-signed certificates.
    pub accept_invalid_certs: bool,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        let directory_url = std::env::var("DSD_DIRECTORY_URL")
            .map_err(|_| DsdError::Config("DSD_DIRECTORY_URL not set".into()))?;

        let bind_addr =
            std::env::var("DSD_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let timeout_secs: u64 = std::env::var("DSD_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let accept_invalid_certs = std::env::var("DSD_ACCEPT_INVALID_CERTS")
            .ok()
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            directory_url,
            bind_addr,
            http_timeout: Duration::from_secs(timeout_secs),
            accept_invalid_certs,
        })
    }
}
