// =============================================================================
// Runtime Configuration — service settings with atomic save
// =============================================================================
//
// Every tunable the dashboard service needs lives here: what to fetch, how to
// compute the indicators, and where the collaborators are.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// Secrets are NOT part of this file; the advisory API key comes from the
// environment only.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::indicators::DEFAULT_RSI_PERIOD;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_ticker() -> String {
    "NVDA".to_string()
}

fn default_range() -> String {
    "6mo".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_rsi_period() -> usize {
    DEFAULT_RSI_PERIOD
}

fn default_advisory_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_advisory_language() -> String {
    "Chinese".to_string()
}

fn default_market_data_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_advisory_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_http_timeout_secs() -> u64 {
    20
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration for the stock-lens service.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Request defaults ---------------------------------------------------

    /// Ticker used when a request does not name one.
    #[serde(default = "default_ticker")]
    pub default_ticker: String,

    /// Look-back window passed to the market data provider (e.g. "6mo").
    #[serde(default = "default_range")]
    pub range: String,

    /// Bar granularity (e.g. "1d").
    #[serde(default = "default_interval")]
    pub interval: String,

    /// RSI window length. Must be >= 1.
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    // --- Advisory -----------------------------------------------------------

    /// Hosted model that answers the advisory prompt.
    #[serde(default = "default_advisory_model")]
    pub advisory_model: String,

    /// Language the advice should be written in.
    #[serde(default = "default_advisory_language")]
    pub advisory_language: String,

    // --- Collaborator endpoints ---------------------------------------------

    #[serde(default = "default_market_data_url")]
    pub market_data_url: String,

    #[serde(default = "default_advisory_url")]
    pub advisory_url: String,

    /// Per-request timeout for both collaborators.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    // --- Server -------------------------------------------------------------

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_ticker: default_ticker(),
            range: default_range(),
            interval: default_interval(),
            rsi_period: default_rsi_period(),
            advisory_model: default_advisory_model(),
            advisory_language: default_advisory_language(),
            market_data_url: default_market_data_url(),
            advisory_url: default_advisory_url(),
            http_timeout_secs: default_http_timeout_secs(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid runtime config in {}", path.display()))?;

        info!(
            path = %path.display(),
            default_ticker = %config.default_ticker,
            range = %config.range,
            rsi_period = config.rsi_period,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.rsi_period == 0 {
            anyhow::bail!("rsi_period must be at least 1");
        }
        if self.http_timeout_secs == 0 {
            anyhow::bail!("http_timeout_secs must be at least 1");
        }
        if self.default_ticker.trim().is_empty() {
            anyhow::bail!("default_ticker must not be empty");
        }
        Ok(())
    }

    /// Load `path`, or write the defaults there when it does not exist yet.
    ///
    /// A file that exists but cannot be read or fails validation is left
    /// untouched and the defaults are used for this run.
    pub fn load_or_create(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
                Self::default()
            });
        }

        // First run: leave an editable copy of the defaults behind.
        let defaults = Self::default();
        if let Err(e) = defaults.save(path) {
            warn!(path = %path.display(), error = %e, "Failed to write default config");
        }
        defaults
    }

    /// Apply `STOCK_LENS_*` environment overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Blank values are ignored; the ticker is trimmed and upper-cased.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(ticker) = value("STOCK_LENS_TICKER") {
            self.default_ticker = ticker.to_uppercase();
        }
        if let Some(addr) = value("STOCK_LENS_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(model) = value("STOCK_LENS_MODEL") {
            self.advisory_model = model;
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.default_ticker, "NVDA");
        assert_eq!(cfg.range, "6mo");
        assert_eq!(cfg.interval, "1d");
        assert_eq!(cfg.rsi_period, 14);
        assert_eq!(cfg.advisory_model, "gemini-1.5-flash");
        assert_eq!(cfg.http_timeout(), Duration::from_secs(20));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.default_ticker, "NVDA");
        assert_eq!(cfg.rsi_period, 14);
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "default_ticker": "AAPL", "rsi_period": 9 }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.default_ticker, "AAPL");
        assert_eq!(cfg.rsi_period, 9);
        assert_eq!(cfg.range, "6mo");
    }

    #[test]
    fn zero_period_fails_validation() {
        let cfg = RuntimeConfig {
            rsi_period: 0,
            ..RuntimeConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock_lens.json");

        let cfg = RuntimeConfig {
            default_ticker: "MSFT".to_string(),
            rsi_period: 21,
            ..RuntimeConfig::default()
        };
        cfg.save(&path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded.default_ticker, "MSFT");
        assert_eq!(loaded.rsi_period, 21);
    }

    #[test]
    fn load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "rsi_period": 0 }"#).unwrap();
        assert!(RuntimeConfig::load(&path).is_err());
        assert!(RuntimeConfig::load(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn load_or_create_writes_defaults_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock_lens.json");

        let cfg = RuntimeConfig::load_or_create(&path);
        assert_eq!(cfg.default_ticker, "NVDA");
        assert!(path.exists());
        assert_eq!(RuntimeConfig::load(&path).unwrap().rsi_period, 14);
    }

    #[test]
    fn load_or_create_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock_lens.json");
        std::fs::write(&path, r#"{ "default_ticker": "TSLA" }"#).unwrap();

        assert_eq!(RuntimeConfig::load_or_create(&path).default_ticker, "TSLA");
    }

    #[test]
    fn load_or_create_keeps_broken_file_and_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock_lens.json");
        std::fs::write(&path, "{ not json").unwrap();

        let cfg = RuntimeConfig::load_or_create(&path);
        assert_eq!(cfg.default_ticker, "NVDA");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut cfg = RuntimeConfig::default();
        cfg.apply_overrides(|key| match key {
            "STOCK_LENS_TICKER" => Some("  aapl ".to_string()),
            "STOCK_LENS_BIND_ADDR" => Some("127.0.0.1:8080".to_string()),
            "STOCK_LENS_MODEL" => Some(" gemini-1.5-pro ".to_string()),
            _ => None,
        });
        assert_eq!(cfg.default_ticker, "AAPL");
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.advisory_model, "gemini-1.5-pro");
    }

    #[test]
    fn blank_or_missing_overrides_are_ignored() {
        let mut cfg = RuntimeConfig::default();
        cfg.apply_overrides(|key| match key {
            "STOCK_LENS_TICKER" => Some("   ".to_string()),
            "STOCK_LENS_MODEL" => Some(String::new()),
            _ => None,
        });
        assert_eq!(cfg.default_ticker, "NVDA");
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
        assert_eq!(cfg.advisory_model, "gemini-1.5-flash");
    }
}
