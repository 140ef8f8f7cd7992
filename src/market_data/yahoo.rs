// =============================================================================
// Yahoo Finance Chart Client — public daily history, no authentication
// =============================================================================
//
// GET {base}/v8/finance/chart/{ticker}?range=6mo&interval=1d
//
// The response is column-oriented: one `timestamp` array plus parallel
// `open/high/low/close/volume` arrays under `indicators.quote[0]`. Entries are
// `null` for rows the exchange never printed (halts, partial days); those rows
// are skipped. Unknown tickers come back as HTTP 404 with
// `chart.error.code == "Not Found"` and map to an empty series.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{MarketDataProvider, PriceBar, PriceSeries};
use crate::types::{fallback_message, ProviderError};

const PROVIDER: &str = "yahoo";

/// Browser-like agent; the chart endpoint throttles clients without one.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; stock-lens/0.1)";

/// Yahoo Finance chart API client.
#[derive(Clone, Debug)]
pub struct YahooChartProvider {
    base_url: Url,
    client: reqwest::Client,
}

impl YahooChartProvider {
    /// Create a client against `base_url` (normally
    /// `https://query1.finance.yahoo.com`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let base_url = Url::parse(base_url)
            .map_err(|_| ProviderError::NotConfigured("market data base url is not a valid URL"))?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        debug!(base_url = %base_url, "YahooChartProvider initialised");

        Ok(Self { base_url, client })
    }

    fn chart_url(&self, ticker: &str) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::NotConfigured("market data base url cannot take a path"))?
            .pop_if_empty()
            .extend(&["v8", "finance", "chart", ticker]);
        Ok(url)
    }
}

#[async_trait]
impl MarketDataProvider for YahooChartProvider {
    #[instrument(skip(self), name = "yahoo::fetch_series")]
    async fn fetch_series(
        &self,
        ticker: &str,
        range: &str,
        interval: &str,
    ) -> Result<PriceSeries, ProviderError> {
        let url = self.chart_url(ticker)?;

        let resp = self
            .client
            .get(url)
            .query(&[("range", range), ("interval", interval)])
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            info!(ticker, "ticker not found at provider");
            return Ok(PriceSeries::empty());
        }

        // Error bodies are not always JSON (e.g. a plain-text 429).
        let text = resp.text().await?;
        let body: Option<Value> = serde_json::from_str(&text).ok();
        if body.as_ref().is_some_and(is_not_found) {
            info!(ticker, "ticker not found at provider");
            return Ok(PriceSeries::empty());
        }

        if !status.is_success() {
            let message = body
                .as_ref()
                .and_then(error_description)
                .unwrap_or_else(|| fallback_message(status, &text));
            warn!(ticker, status = status.as_u16(), %message, "chart request rejected");
            return Err(ProviderError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                message,
            });
        }

        let body = body
            .ok_or_else(|| ProviderError::Malformed("chart response is not JSON".to_string()))?;
        let bars = parse_chart(&body)?;
        debug!(ticker, range, interval, count = bars.len(), "chart fetched");
        Ok(PriceSeries::new(bars)?)
    }
}

// =============================================================================
// Response parsing
// =============================================================================

fn is_not_found(body: &Value) -> bool {
    body["chart"]["error"]["code"].as_str() == Some("Not Found")
}

fn error_description(body: &Value) -> Option<String> {
    body["chart"]["error"]["description"]
        .as_str()
        .map(str::to_string)
}

/// Turn a chart response into bars, oldest first.
///
/// A result without a `timestamp` array (ticker exists but no trading in the
/// range) yields no bars.
fn parse_chart(body: &Value) -> Result<Vec<PriceBar>, ProviderError> {
    let result = match body["chart"]["result"].as_array().and_then(|r| r.first()) {
        Some(r) => r,
        None => return Ok(Vec::new()),
    };

    let timestamps = match result["timestamp"].as_array() {
        Some(ts) => ts,
        None => return Ok(Vec::new()),
    };

    let quote = &result["indicators"]["quote"][0];
    let (opens, highs, lows, closes, volumes) = (
        column(quote, "open")?,
        column(quote, "high")?,
        column(quote, "low")?,
        column(quote, "close")?,
        column(quote, "volume")?,
    );

    let mut bars = Vec::with_capacity(timestamps.len());

    for (i, ts) in timestamps.iter().enumerate() {
        let secs = ts
            .as_i64()
            .ok_or_else(|| ProviderError::Malformed(format!("timestamp {i} is not an integer")))?;
        let timestamp = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| ProviderError::Malformed(format!("timestamp {secs} out of range")))?;

        let row = (
            opens.get(i).and_then(Value::as_f64),
            highs.get(i).and_then(Value::as_f64),
            lows.get(i).and_then(Value::as_f64),
            closes.get(i).and_then(Value::as_f64),
        );

        match row {
            (Some(open), Some(high), Some(low), Some(close)) => {
                let volume = volumes.get(i).and_then(Value::as_f64).unwrap_or(0.0);
                bars.push(PriceBar::new(timestamp, open, high, low, close, volume));
            }
            _ => {
                warn!(index = i, %timestamp, "skipping chart row with missing prices");
            }
        }
    }

    Ok(bars)
}

fn column<'a>(quote: &'a Value, name: &str) -> Result<&'a [Value], ProviderError> {
    quote[name]
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| ProviderError::Malformed(format!("quote is missing '{name}' column")))
}
