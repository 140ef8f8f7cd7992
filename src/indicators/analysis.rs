// =============================================================================
// Analysis Pipeline — one request, one series, one report
// =============================================================================
//
// closes -> RSI series -> latest RSI + zone
// bars   -> snapshot (or the engine error that prevented it)
// snapshot + latest RSI -> advisory context
//
// The report owns its copy of the bars so the display layer can draw the
// candlesticks from the same data the metrics were computed on.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::{
    build_advisory_context, compute_rsi, compute_snapshot, latest_rsi, AdvisoryContext,
    EngineError, RsiZone, SnapshotMetrics,
};
use crate::market_data::{PriceBar, PriceSeries};

/// Everything the dashboard shows for one ticker.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub request_id: Uuid,
    pub ticker: String,
    pub generated_at: DateTime<Utc>,
    pub rsi_period: usize,
    pub bars: Vec<PriceBar>,
    pub rsi: Vec<Option<f64>>,
    pub latest_rsi: Option<f64>,
    pub rsi_zone: Option<RsiZone>,
    pub snapshot: Option<SnapshotMetrics>,
    /// Why `snapshot` is missing, when it is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_error: Option<EngineError>,
    pub advisory_context: Option<AdvisoryContext>,
}

/// Run every indicator over `series`.
///
/// Never fails: engine errors are carried inside the report.
pub fn analyze(ticker: &str, series: &PriceSeries, rsi_period: usize) -> AnalysisReport {
    let rsi = compute_rsi(&series.closes(), rsi_period);
    let latest = latest_rsi(&rsi);

    let (snapshot, snapshot_error) = match compute_snapshot(series.bars()) {
        Ok(s) => (Some(s.with_rsi(latest)), None),
        Err(e) => (None, Some(e)),
    };

    let advisory_context = snapshot
        .as_ref()
        .map(|s| build_advisory_context(ticker, s, latest));

    debug!(
        ticker,
        bars = series.len(),
        latest_rsi = ?latest,
        snapshot_ok = snapshot.is_some(),
        "analysis computed"
    );

    AnalysisReport {
        request_id: Uuid::new_v4(),
        ticker: ticker.to_string(),
        generated_at: Utc::now(),
        rsi_period,
        bars: series.bars().to_vec(),
        rsi,
        latest_rsi: latest,
        rsi_zone: latest.map(RsiZone::classify),
        snapshot,
        snapshot_error,
        advisory_context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::series::fixtures::daily_series;

    #[test]
    fn full_report_for_rising_series() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let report = analyze("NVDA", &daily_series(&closes), 14);

        assert_eq!(report.ticker, "NVDA");
        assert_eq!(report.bars.len(), 20);
        assert_eq!(report.rsi.len(), 20);
        assert_eq!(report.latest_rsi, Some(100.0));
        assert_eq!(report.rsi_zone, Some(RsiZone::Overbought));

        let snap = report.snapshot.as_ref().unwrap();
        assert_eq!(snap.price, 20.0);
        assert_eq!(snap.rsi, Some(100.0));
        assert!(report.snapshot_error.is_none());

        let ctx = report.advisory_context.as_ref().unwrap();
        assert_eq!(ctx.ticker, "NVDA");
        assert_eq!(ctx.rsi, Some(100.0));
    }

    #[test]
    fn short_series_has_snapshot_but_no_rsi() {
        let report = analyze("AAPL", &daily_series(&[100.0, 110.0]), 14);
        assert_eq!(report.rsi, vec![None, None]);
        assert_eq!(report.latest_rsi, None);
        assert_eq!(report.rsi_zone, None);
        let snap = report.snapshot.unwrap();
        assert!((snap.percent_change - 10.0).abs() < 1e-12);
        assert_eq!(report.advisory_context.unwrap().rsi, None);
    }

    #[test]
    fn zero_prior_close_keeps_rsi_and_reports_error() {
        let report = analyze("ZERO", &daily_series(&[0.0, 1.0]), 1);
        assert!(report.snapshot.is_none());
        assert!(report.advisory_context.is_none());
        assert!(matches!(
            report.snapshot_error,
            Some(EngineError::DivisionByZero { .. })
        ));
        assert_eq!(report.latest_rsi, Some(100.0));
    }

    #[test]
    fn empty_series_reports_insufficient_data() {
        let report = analyze("NONE", &PriceSeries::empty(), 14);
        assert!(report.rsi.is_empty());
        assert!(matches!(
            report.snapshot_error,
            Some(EngineError::InsufficientData { .. })
        ));
    }

    #[test]
    fn report_serialises_error_kind() {
        let report = analyze("ZERO", &daily_series(&[0.0, 1.0]), 14);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["snapshot_error"]["kind"], "division_by_zero");
        assert!(json["snapshot"].is_null());
    }
}
