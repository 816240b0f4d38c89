//! DSD service entry point.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use dsd_api::directory::{DirectoryClient, DirectoryClientConfig};
use dsd_api::pipeline::QueryPipeline;

use dsd_service::config::ServiceConfig;
use dsd_service::server::{self, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        "--------- RUNNING DSD-{} ---------",
        env!("CARGO_PKG_VERSION")
    );

    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };
    tracing::debug!(directory_url = %config.directory_url, "using directory");

    let client_config = DirectoryClientConfig {
        timeout: config.http_timeout,
        accept_invalid_certs: config.accept_invalid_certs,
    };
    let directory = match DirectoryClient::new(&config.directory_url, &client_config) {
        Ok(directory) => directory,
        Err(e) => {
            tracing::error!(error = %e, "failed to build directory client");
            std::process::exit(1);
        }
    };

    let pipeline = Arc::new(QueryPipeline::new(directory));

    // Warm the transformer off the request path
    let warm = Arc::clone(&pipeline);
    tokio::task::spawn_blocking(move || warm.warm_up());

    let app = server::router(AppState { pipeline });

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "failed to bind on {}", config.bind_addr);
            std::process::exit(1);
        }
    };
    tracing::info!("listening on {}", config.bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
