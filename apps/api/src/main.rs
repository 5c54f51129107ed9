mod analysis;
mod config;
mod errors;
mod extraction;
mod matching;
mod rate_limit;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::WorkersAiAnalyzer;
use crate::config::Config;
use crate::rate_limit::{spawn_sweeper, RateLimiter};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values; missing AI
    // credentials are tolerated until the first analysis call)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-match API v{}", env!("CARGO_PKG_VERSION"));
    if config.cloudflare_account_id.is_none() || config.cloudflare_api_token.is_none() {
        tracing::warn!(
            "Cloudflare credentials not configured; match requests will fail until \
             CLOUDFLARE_ACCOUNT_ID and CLOUDFLARE_API_TOKEN are set"
        );
    }

    // Initialize the throttle table and its housekeeping task
    let limiter = Arc::new(RateLimiter::new());
    spawn_sweeper(limiter.clone());
    info!(
        "Rate limiter initialized ({} requests / {}s window)",
        config.rate_limit_max, config.rate_limit_window_secs
    );

    // Initialize the analyzer
    let analyzer = Arc::new(WorkersAiAnalyzer::from_config(&config));
    info!("Analyzer initialized (model: {})", analysis::MODEL);

    // Build app state
    let state = AppState {
        config: config.clone(),
        limiter,
        analyzer,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
