mod aggregator;
mod config;
mod feed;
mod routes;
mod worker_pool;

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "videoroll=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("VIDEOROLL_CONFIG").unwrap_or_else(|_| "videoroll.toml".to_string());
    let config = Config::load(&config_path)?;
    info!(
        "Loaded {} feed sources from {}",
        config.feeds.len(),
        config_path
    );
    if config.include_shorts {
        // Carried in config for forward compatibility; the feed payloads
        // expose no shorts marker to filter on yet
        tracing::debug!("include_shorts is set but shorts filtering is not implemented");
    }

    // Shared HTTP client for all feed fetches
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent("Videoroll/1.0 (Feed Aggregator)")
        .build()?;

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState { client, config });

    // Build router
    let app = Router::new()
        .route("/videos", get(routes::videos))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server starting on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
