mod error;
mod routes;
mod state;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use stock_chart_providers::yahoo::YahooProvider;
use tower_http::cors::CorsLayer;
use tracing::info;

use state::AppState;

#[derive(Parser)]
#[command(name = "stock-chart", about = "Serve stock OHLC chart history")]
struct Cli {
    /// Bind address
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Listen port
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Override the Yahoo chart API base URL (for testing/proxying)
    #[arg(long)]
    yahoo_base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    let provider = match &cli.yahoo_base_url {
        Some(base_url) => YahooProvider::with_base_url(base_url.clone()),
        None => YahooProvider::new(),
    };

    let state = AppState::new(Box::new(provider));

    // CORS is permissive: the chart front-end is served separately.
    let app = Router::new()
        .merge(routes::api_router())
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port)
        .parse()
        .context("invalid bind address")?;

    info!("stock-chart listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {e}");
        return;
    }
    info!("Shutdown signal received, stopping");
}
