use std::time::Duration;

use anyhow::Result;
use shared::{Config, FeedClient, Store};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::routes;
use server::sampler::Sampler;

/// Upper bound on a single feed request; also bounds how long shutdown can
/// wait on an in-flight tick.
const FEED_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting price sampling service...");

    let config = Config::from_env()?;

    // The store must be ready before the sampler takes its first tick.
    let store = Store::open(&config.database_path).await?;
    store.initialize().await?;

    let feed = FeedClient::new(FEED_TIMEOUT)?;
    let sampler = Sampler::new(
        store.clone(),
        feed,
        config.instruments.clone(),
        Duration::from_secs(config.fetch_interval_secs),
    );
    let mut sampler = sampler.start();

    let app = routes::router(store.clone()).layer(TraceLayer::new_for_http());
    let addr = format!("{}:{}", config.api_host, config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain the sampler before the process exits.
    sampler.shutdown().await;
    store.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
}
