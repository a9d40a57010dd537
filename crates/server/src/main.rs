//! kiosk-web entry point.
//!
//! Boots the HTTP server: layered config, upstream client, news service,
//! then the axum router.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use kiosk_client::NewsApiClient;
use kiosk_core::AppConfig;

mod error;
mod news;
mod routes;
mod views;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    let client = Arc::new(NewsApiClient::from_app_config(&config)?);
    let config = Arc::new(config);
    let service = Arc::new(news::NewsService::new(client, &config));

    let app = routes::router(routes::AppState { service, config: config.clone() });

    tracing::info!(addr = %config.bind_addr, "starting kiosk-web");
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
