use async_trait::async_trait;

use super::PriceSeries;
use crate::types::ProviderError;

/// Source of daily price history.
///
/// Implementations return an empty [`PriceSeries`] for an unknown ticker so
/// that callers can tell "not found" apart from a failed request.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch bars for `ticker` covering `range` (e.g. `"6mo"`) at
    /// `interval` granularity (e.g. `"1d"`), oldest first.
    async fn fetch_series(
        &self,
        ticker: &str,
        range: &str,
        interval: &str,
    ) -> Result<PriceSeries, ProviderError>;
}
