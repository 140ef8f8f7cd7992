// =============================================================================
// Analysis Service — orchestration between collaborators and the engine
// =============================================================================
//
// market data provider -> PriceSeries -> indicators::analyze -> report
//                                                 report -> prompt -> advisor
//
// The collaborators are injected at construction; nothing here reaches for a
// global client or reads a secret. An empty series is a distinct `NoData`
// outcome. Advisor trouble degrades to `Advice::Unavailable` next to an intact
// report, so metrics already computed are always returned.
// =============================================================================

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::advisor::{build_prompt, AdvisoryProvider};
use crate::indicators::{analyze, AnalysisReport};
use crate::market_data::MarketDataProvider;
use crate::runtime_config::RuntimeConfig;
use crate::types::ProviderError;

// =============================================================================
// Outcomes
// =============================================================================

/// Result of fetching and analysing one ticker.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// The provider knows nothing about the ticker.
    NoData { ticker: String },
    Ready(AnalysisReport),
}

/// Advisory text, or why there is none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Advice {
    Ready { text: String },
    Unavailable { reason: String },
}

#[derive(Debug, Clone)]
pub enum AdviceOutcome {
    NoData { ticker: String },
    Ready {
        report: AnalysisReport,
        advice: Advice,
    },
}

// =============================================================================
// Settings
// =============================================================================

/// Per-request knobs copied out of [`RuntimeConfig`].
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub default_ticker: String,
    pub range: String,
    pub interval: String,
    pub rsi_period: usize,
    pub advisory_language: String,
}

impl From<&RuntimeConfig> for AnalysisSettings {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            default_ticker: config.default_ticker.clone(),
            range: config.range.clone(),
            interval: config.interval.clone(),
            rsi_period: config.rsi_period,
            advisory_language: config.advisory_language.clone(),
        }
    }
}

// =============================================================================
// AnalysisService
// =============================================================================

pub struct AnalysisService {
    market_data: Arc<dyn MarketDataProvider>,
    advisor: Option<Arc<dyn AdvisoryProvider>>,
    settings: AnalysisSettings,
}

impl AnalysisService {
    pub fn new(
        market_data: Arc<dyn MarketDataProvider>,
        advisor: Option<Arc<dyn AdvisoryProvider>>,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            market_data,
            advisor,
            settings,
        }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn has_advisor(&self) -> bool {
        self.advisor.is_some()
    }

    /// Trim and upper-case `raw`; blank input selects the default ticker.
    pub fn normalize_ticker(&self, raw: &str) -> String {
        let ticker = raw.trim().to_uppercase();
        if ticker.is_empty() {
            self.settings.default_ticker.clone()
        } else {
            ticker
        }
    }

    /// Fetch the configured window for `ticker` and run the indicators.
    #[instrument(skip(self))]
    pub async fn analyze(&self, ticker: &str) -> Result<AnalysisOutcome, ProviderError> {
        let ticker = self.normalize_ticker(ticker);

        let series = self
            .market_data
            .fetch_series(&ticker, &self.settings.range, &self.settings.interval)
            .await?;

        if series.is_empty() {
            info!(%ticker, "no price data for ticker");
            return Ok(AnalysisOutcome::NoData { ticker });
        }

        let report = analyze(&ticker, &series, self.settings.rsi_period);
        info!(
            %ticker,
            request_id = %report.request_id,
            bars = report.bars.len(),
            latest_rsi = ?report.latest_rsi,
            "analysis ready"
        );
        Ok(AnalysisOutcome::Ready(report))
    }

    /// Analyse `ticker`, then ask the advisor for an opinion on the result.
    ///
    /// Only a market data failure is an `Err`; advisor problems are folded
    /// into [`Advice::Unavailable`].
    #[instrument(skip(self))]
    pub async fn advise(&self, ticker: &str) -> Result<AdviceOutcome, ProviderError> {
        let report = match self.analyze(ticker).await? {
            AnalysisOutcome::NoData { ticker } => return Ok(AdviceOutcome::NoData { ticker }),
            AnalysisOutcome::Ready(report) => report,
        };

        let advice = self.request_advice(&report).await;
        Ok(AdviceOutcome::Ready { report, advice })
    }

    async fn request_advice(&self, report: &AnalysisReport) -> Advice {
        let Some(advisor) = self.advisor.as_ref() else {
            return Advice::Unavailable {
                reason: "advisory service is not configured".to_string(),
            };
        };

        let Some(context) = report.advisory_context.as_ref() else {
            let reason = match &report.snapshot_error {
                Some(e) => format!("metrics incomplete: {e}"),
                None => "metrics incomplete".to_string(),
            };
            return Advice::Unavailable { reason };
        };

        let prompt = build_prompt(context, &self.settings.advisory_language);
        match advisor.advise(&prompt).await {
            Ok(text) => Advice::Ready { text },
            Err(e) => {
                warn!(ticker = %report.ticker, error = %e, "advisory request failed");
                Advice::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================


#[cfg(test)]
mod tests {
    use super::stubs::*;
    use super::*;

    fn rising() -> Vec<f64> {
        (1..=30).map(|x| 100.0 + x as f64).collect()
    }

    fn service(advisor: Option<Arc<StubAdvisor>>) -> (Arc<StubMarketData>, AnalysisService) {
        let market = Arc::new(StubMarketData::new(rising()));
        let advisor = advisor.map(|a| a as Arc<dyn AdvisoryProvider>);
        let svc = AnalysisService::new(market.clone(), advisor, settings());
        (market, svc)
    }

    #[test]
    fn normalizes_ticker() {
        let (_, svc) = service(None);
        assert_eq!(svc.normalize_ticker(" aapl "), "AAPL");
        assert_eq!(svc.normalize_ticker("   "), "NVDA");
    }

    #[tokio::test]
    async fn analyze_uses_configured_window() {
        let (market, svc) = service(None);
        let outcome = svc.analyze("nvda").await.unwrap();
        let AnalysisOutcome::Ready(report) = outcome else {
            panic!("expected a report");
        };
        assert_eq!(report.ticker, "NVDA");
        assert_eq!(report.latest_rsi, Some(100.0));
        assert_eq!(
            market.requests.lock()[0],
            ("NVDA".to_string(), "6mo".to_string(), "1d".to_string())
        );
    }

    #[tokio::test]
    async fn empty_series_is_no_data() {
        let (_, svc) = service(None);
        match svc.analyze("unknown").await.unwrap() {
            AnalysisOutcome::NoData { ticker } => assert_eq!(ticker, "UNKNOWN"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn provider_failure_is_an_error() {
        let (_, svc) = service(None);
        assert!(matches!(
            svc.analyze("BROKEN").await,
            Err(ProviderError::Api { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn advice_uses_prompt_from_context() {
        let advisor = Arc::new(StubAdvisor::new(false));
        let (_, svc) = service(Some(advisor.clone()));
        let AdviceOutcome::Ready { report, advice } = svc.advise("NVDA").await.unwrap() else {
            panic!("expected advice");
        };
        assert_eq!(
            advice,
            Advice::Ready {
                text: "Hold and watch the RSI.".to_string()
            }
        );
        assert!(report.snapshot.is_some());
        let prompts = advisor.prompts.lock();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("NVDA"));
        assert!(prompts[0].contains("RSI 100.00"));
        assert!(prompts[0].ends_with("in Chinese."));
    }

    #[tokio::test]
    async fn advisor_failure_keeps_report() {
        let (_, svc) = service(Some(Arc::new(StubAdvisor::new(true))));
        let AdviceOutcome::Ready { report, advice } = svc.advise("NVDA").await.unwrap() else {
            panic!("expected report");
        };
        assert_eq!(report.latest_rsi, Some(100.0));
        assert!(report.snapshot.is_some());
        match advice {
            Advice::Unavailable { reason } => assert!(reason.contains("API key not valid")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_advisor_is_unavailable() {
        let (_, svc) = service(None);
        assert!(!svc.has_advisor());
        let AdviceOutcome::Ready { advice, .. } = svc.advise("NVDA").await.unwrap() else {
            panic!("expected report");
        };
        assert!(matches!(advice, Advice::Unavailable { .. }));
    }

    #[tokio::test]
    async fn degenerate_snapshot_skips_advisor() {
        let advisor = Arc::new(StubAdvisor::new(false));
        let market = Arc::new(StubMarketData::new(vec![0.0, 1.0]));
        let svc = AnalysisService::new(
            market,
            Some(advisor.clone() as Arc<dyn AdvisoryProvider>),
            settings(),
        );
        let AdviceOutcome::Ready { report, advice } = svc.advise("ZERO").await.unwrap() else {
            panic!("expected report");
        };
        assert!(report.snapshot_error.is_some());
        match advice {
            Advice::Unavailable { reason } => assert!(reason.contains("division by zero")),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(advisor.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn advise_unknown_ticker_is_no_data() {
        let (_, svc) = service(Some(Arc::new(StubAdvisor::new(false))));
        assert!(matches!(
            svc.advise("UNKNOWN").await.unwrap(),
            AdviceOutcome::NoData { .. }
        ));
    }
}
