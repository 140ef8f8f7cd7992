// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. The dashboard front end renders the
// JSON as price cards, an RSI card, a candlestick chart (from `report.bars`)
// and the advisory text.
//
// Response shapes:
//   - `status: "ok"`      — report (and advice) present.
//   - `status: "no_data"` — the ticker is unknown; a normal 200, not an error.
//   - HTTP 502 `{error}`  — the market data provider failed.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::app_state::AppState;
use crate::indicators::AnalysisReport;
use crate::service::{Advice, AdviceOutcome, AnalysisOutcome};
use crate::types::ProviderError;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/analysis", get(default_analysis))
        .route("/api/v1/analysis/:ticker", get(analysis))
        .route("/api/v1/analysis/:ticker/advice", post(advice))
        .route("/api/v1/errors", get(errors))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Response bodies
// =============================================================================

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum AnalysisResponse {
    Ok {
        report: AnalysisReport,
    },
    NoData {
        ticker: String,
        message: String,
    },
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum AdviceResponse {
    Ok {
        report: AnalysisReport,
        advice: Advice,
    },
    NoData {
        ticker: String,
        message: String,
    },
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn no_data_message(ticker: &str) -> String {
    format!("No price data found for '{ticker}'. Check the ticker symbol.")
}

/// Record a market data failure and map it to 502.
fn upstream_error(state: &AppState, ticker: &str, err: ProviderError) -> ApiError {
    warn!(ticker, error = %err, "market data request failed");
    state.push_error("market_data", ticker, err.to_string());
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({
            "error": format!("market data unavailable: {err}"),
        })),
    )
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
    uptime_secs: u64,
    advisor_configured: bool,
    default_ticker: String,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
        uptime_secs: state.uptime_secs(),
        advisor_configured: state.service.has_advisor(),
        default_ticker: state.service.settings().default_ticker.clone(),
    })
}

// =============================================================================
// Analysis
// =============================================================================

async fn default_analysis(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    run_analysis(&state, "").await
}

async fn analysis(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    run_analysis(&state, &ticker).await
}

async fn run_analysis(state: &AppState, ticker: &str) -> Result<Json<AnalysisResponse>, ApiError> {
    match state.service.analyze(ticker).await {
        Ok(AnalysisOutcome::Ready(report)) => Ok(Json(AnalysisResponse::Ok { report })),
        Ok(AnalysisOutcome::NoData { ticker }) => Ok(Json(AnalysisResponse::NoData {
            message: no_data_message(&ticker),
            ticker,
        })),
        Err(e) => Err(upstream_error(state, &state.service.normalize_ticker(ticker), e)),
    }
}

// =============================================================================
// Advice
// =============================================================================

async fn advice(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<AdviceResponse>, ApiError> {
    match state.service.advise(&ticker).await {
        Ok(AdviceOutcome::Ready { report, advice }) => {
            if let Advice::Unavailable { reason } = &advice {
                // Only a configured advisor that was actually asked counts as
                // a collaborator failure.
                if state.service.has_advisor() && report.advisory_context.is_some() {
                    state.push_error("advisory", &report.ticker, reason.clone());
                }
            }
            Ok(Json(AdviceResponse::Ok { report, advice }))
        }
        Ok(AdviceOutcome::NoData { ticker }) => Ok(Json(AdviceResponse::NoData {
            message: no_data_message(&ticker),
            ticker,
        })),
        Err(e) => Err(upstream_error(
            &state,
            &state.service.normalize_ticker(&ticker),
            e,
        )),
    }
}

// =============================================================================
// Error log
// =============================================================================

async fn errors(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.recent_errors())
}

// =============================================================================
// Tests
// =============================================================================
