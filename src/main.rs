// =============================================================================
// stock-lens — Main Entry Point
// =============================================================================
//
// Serves the single-ticker dashboard API: recent daily history, RSI, the
// latest-bar snapshot, and an optional hosted-model opinion on the numbers.
// The advisory endpoint reports "unavailable" when GEMINI_API_KEY is not set;
// everything else works without it.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod advisor;
mod api;
mod app_state;
mod indicators;
mod market_data;
mod runtime_config;
mod service;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::advisor::{AdvisoryProvider, GeminiAdvisor};
use crate::app_state::AppState;
use crate::market_data::YahooChartProvider;
use crate::runtime_config::RuntimeConfig;
use crate::service::{AnalysisService, AnalysisSettings};

const DEFAULT_CONFIG_PATH: &str = "stock_lens.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("stock-lens starting up");

    let config_path =
        std::env::var("STOCK_LENS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let mut config = RuntimeConfig::load_or_create(&config_path);
    config.apply_env_overrides();
    config.validate().context("invalid configuration")?;

    info!(
        default_ticker = %config.default_ticker,
        range = %config.range,
        interval = %config.interval,
        rsi_period = config.rsi_period,
        "Configuration resolved"
    );

    // ── 2. Collaborators ─────────────────────────────────────────────────
    let market_data = Arc::new(
        YahooChartProvider::new(&config.market_data_url, config.http_timeout())
            .context("failed to build market data client")?,
    );

    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
    let advisor: Option<Arc<dyn AdvisoryProvider>> = if api_key.trim().is_empty() {
        warn!("GEMINI_API_KEY is not set — advisory endpoint will report unavailable");
        None
    } else {
        let gemini = GeminiAdvisor::new(
            &api_key,
            config.advisory_model.clone(),
            config.advisory_url.clone(),
            config.http_timeout(),
        )
        .context("failed to build advisory client")?;
        info!(model = %config.advisory_model, "Advisory client ready");
        Some(Arc::new(gemini) as Arc<dyn AdvisoryProvider>)
    };

    // ── 3. Shared state ──────────────────────────────────────────────────
    let service = AnalysisService::new(market_data, advisor, AnalysisSettings::from(&config));
    let state = Arc::new(AppState::new(service));

    // ── 4. API server ────────────────────────────────────────────────────
    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!("stock-lens shut down complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal — running until killed");
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received — stopping gracefully");
}
