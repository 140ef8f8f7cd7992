// =============================================================================
// Snapshot Metrics — latest-bar summary for the price cards
// =============================================================================
//
// change         = last.close - prior_close
// percent_change = change / prior_close * 100
//
// `prior_close` is the close of the second-to-last bar, or the open of the
// only bar when the series has a single entry.

use serde::Serialize;

use super::EngineError;
use crate::market_data::PriceBar;

/// Read-only summary of the most recent bar(s).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotMetrics {
    pub price: f64,
    pub prior_close: f64,
    pub change: f64,
    pub percent_change: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    /// Latest RSI reading; filled in by the analysis pipeline.
    pub rsi: Option<f64>,
}

impl SnapshotMetrics {
    pub fn with_rsi(mut self, rsi: Option<f64>) -> Self {
        self.rsi = rsi;
        self
    }
}

/// Summarise the tail of `bars`.
///
/// Fails with [`EngineError::InsufficientData`] on an empty slice and with
/// [`EngineError::DivisionByZero`] when the prior close is zero.
pub fn compute_snapshot(bars: &[PriceBar]) -> Result<SnapshotMetrics, EngineError> {
    let last = bars.last().ok_or(EngineError::InsufficientData {
        required: 1,
        available: 0,
    })?;

    let prior_close = match bars.len() {
        1 => last.open,
        n => bars[n - 2].close,
    };

    if prior_close == 0.0 {
        return Err(EngineError::DivisionByZero {
            what: "prior close",
        });
    }

    let change = last.close - prior_close;

    Ok(SnapshotMetrics {
        price: last.close,
        prior_close,
        change,
        percent_change: change / prior_close * 100.0,
        open: last.open,
        high: last.high,
        low: last.low,
        volume: last.volume,
        rsi: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::series::fixtures::daily_bars;

    #[test]
    fn two_bars_use_previous_close() {
        let bars = daily_bars(&[100.0, 110.0]);
        let snap = compute_snapshot(&bars).unwrap();
        assert_eq!(snap.price, 110.0);
        assert_eq!(snap.prior_close, 100.0);
        assert!((snap.change - 10.0).abs() < 1e-12);
        assert!((snap.percent_change - 10.0).abs() < 1e-12);
        assert_eq!(snap.rsi, None);
    }

    #[test]
    fn copies_last_bar_fields() {
        let bars = daily_bars(&[50.0, 48.0, 49.5]);
        let snap = compute_snapshot(&bars).unwrap();
        let last = &bars[2];
        assert_eq!(snap.open, last.open);
        assert_eq!(snap.high, last.high);
        assert_eq!(snap.low, last.low);
        assert_eq!(snap.volume, last.volume);
        assert!((snap.change - 1.5).abs() < 1e-12);
    }

    #[test]
    fn single_bar_falls_back_to_open() {
        let mut bars = daily_bars(&[20.0]);
        bars[0].open = 25.0;
        let snap = compute_snapshot(&bars).unwrap();
        assert_eq!(snap.prior_close, 25.0);
        assert!((snap.change + 5.0).abs() < 1e-12);
        assert!((snap.percent_change + 20.0).abs() < 1e-12);
    }

    #[test]
    fn zero_prior_close_is_reported() {
        let bars = daily_bars(&[0.0, 5.0]);
        assert_eq!(
            compute_snapshot(&bars),
            Err(EngineError::DivisionByZero {
                what: "prior close"
            })
        );
    }

    #[test]
    fn zero_open_on_single_bar_is_reported() {
        let mut bars = daily_bars(&[5.0]);
        bars[0].open = 0.0;
        assert!(matches!(
            compute_snapshot(&bars),
            Err(EngineError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn empty_input_is_insufficient() {
        assert_eq!(
            compute_snapshot(&[]),
            Err(EngineError::InsufficientData {
                required: 1,
                available: 0
            })
        );
    }

    #[test]
    fn with_rsi_attaches_reading() {
        let snap = compute_snapshot(&daily_bars(&[1.0, 2.0]))
            .unwrap()
            .with_rsi(Some(61.5));
        assert_eq!(snap.rsi, Some(61.5));
    }
}
