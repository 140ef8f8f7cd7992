use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::indicators::EngineError;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One OHLCV record for a single trading period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
    }
}

// ---------------------------------------------------------------------------
// PriceSeries -- validated, immutable, oldest-first
// ---------------------------------------------------------------------------

/// Time-ordered sequence of bars for one ticker.
///
/// Construction checks that timestamps are strictly ascending (so there are
/// no duplicates) and that every value is finite. Gaps between bars, such as
/// weekends and holidays, are accepted. There is no way to mutate a series
/// once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Validate `bars` and wrap them.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, EngineError> {
        for (index, bar) in bars.iter().enumerate() {
            if !bar.is_finite() {
                return Err(EngineError::InvalidBar { index });
            }
            if index > 0 && bars[index - 1].timestamp >= bar.timestamp {
                return Err(EngineError::UnorderedSeries { index });
            }
        }
        Ok(Self { bars })
    }

    /// The empty series, which providers return for unknown tickers.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
