use std::sync::Arc;

use anyhow::{Context, Result};
use campus_transit::{Provider, config, router};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};
use tracking::{Tracker, TrackingConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    Registry::default().with(filter).with(fmt::layer()).init();

    let provider = Arc::new(Provider::new()?);
    let tracker = Arc::new(Tracker::new(provider, TrackingConfig::from_env()));

    let addr = config::listen_addr();
    let listener = TcpListener::bind(&addr).await.with_context(|| format!("binding {addr}"))?;
    info!(addr = %addr, "campus transit listening");

    axum::serve(listener, router(Arc::clone(&tracker)))
        .with_graceful_shutdown(shutdown())
        .await
        .context("serving http")?;

    tracker.stop();
    Ok(())
}

async fn shutdown() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
}
