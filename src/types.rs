// =============================================================================
// Shared types used across the stock-lens service
// =============================================================================

use thiserror::Error;

use crate::indicators::EngineError;

/// Failure of an external collaborator (market data or advisory API).
///
/// These never carry an "empty result" case: a ticker the market data
/// provider does not know comes back as an empty series instead.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure, timeout, or TLS error.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote API answered with a non-success status.
    #[error("{provider} returned {status}: {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The provider returned bars that do not form a valid series.
    #[error("invalid price series: {0}")]
    InvalidSeries(#[from] EngineError),

    /// The collaborator is missing required configuration (e.g. an API key).
    #[error("not configured: {0}")]
    NotConfigured(&'static str),
}

/// Message for a rejected request whose body carried no structured error:
/// the trimmed body text, or the status reason when the body is empty.
pub fn fallback_message(status: reqwest::StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status.canonical_reason().unwrap_or("no reason given").to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn fallback_message_prefers_body_text() {
        assert_eq!(
            fallback_message(StatusCode::TOO_MANY_REQUESTS, " Too Many Requests\n"),
            "Too Many Requests"
        );
        assert_eq!(
            fallback_message(StatusCode::SERVICE_UNAVAILABLE, ""),
            "Service Unavailable"
        );
    }
}
