// =============================================================================
// Central Application State — stock-lens
// =============================================================================
//
// Shared by every request handler via `Arc<AppState>`. The analysis service
// itself is stateless; the only mutable data is the bounded log of
// collaborator failures shown on the dashboard.
//
// Thread safety:
//   - parking_lot::RwLock for the error log.
//   - The service and its providers are `Send + Sync` and shared read-only.
// =============================================================================

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use crate::service::AnalysisService;

// =============================================================================
// Error Record
// =============================================================================

/// A recorded error event for the dashboard error log.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// Human-readable error message.
    pub message: String,
    /// Which collaborator failed ("market_data" / "advisory").
    pub source: &'static str,
    /// Ticker the failing request was for.
    pub ticker: String,
    /// ISO 8601 timestamp.
    pub at: String,
}

// =============================================================================
// AppState
// =============================================================================

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

pub struct AppState {
    pub service: AnalysisService,
    pub recent_errors: RwLock<Vec<ErrorRecord>>,
    /// Instant when the service was started. Used for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(service: AnalysisService) -> Self {
        Self {
            service,
            recent_errors: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    /// Record a collaborator failure. The log is capped at
    /// [`MAX_RECENT_ERRORS`]; oldest entries are evicted first.
    pub fn push_error(&self, source: &'static str, ticker: &str, message: String) {
        let record = ErrorRecord {
            message,
            source,
            ticker: ticker.to_string(),
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }
    }

    pub fn recent_errors(&self) -> Vec<ErrorRecord> {
        self.recent_errors.read().clone()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
