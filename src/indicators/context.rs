use serde::Serialize;

use super::SnapshotMetrics;

/// Flat key-value record handed to the prompt builder.
///
/// Values are raw numbers; rounding and wording belong to whoever renders
/// the prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryContext {
    pub ticker: String,
    pub price: f64,
    pub change: f64,
    pub percent_change: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub rsi: Option<f64>,
}

pub fn build_advisory_context(
    ticker: &str,
    snapshot: &SnapshotMetrics,
    rsi: Option<f64>,
) -> AdvisoryContext {
    AdvisoryContext {
        ticker: ticker.to_string(),
        price: snapshot.price,
        change: snapshot.change,
        percent_change: snapshot.percent_change,
        open: snapshot.open,
        high: snapshot.high,
        low: snapshot.low,
        volume: snapshot.volume,
        rsi,
    }
}
