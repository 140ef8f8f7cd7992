// =============================================================================
// Gemini generateContent Client
// =============================================================================
//
// POST {base}/v1beta/models/{model}:generateContent
//   header  x-goog-api-key: <key>
//   body    {"contents":[{"parts":[{"text": <prompt>}]}]}
//
// The reply text is the concatenation of `candidates[0].content.parts[*].text`.
//
// SECURITY: The API key travels only in the request header. It is never
// logged, placed in the URL, or printed by `Debug`.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::AdvisoryProvider;
use crate::types::{fallback_message, ProviderError};

const PROVIDER: &str = "gemini";

/// Client for Google's hosted Gemini models.
#[derive(Clone)]
pub struct GeminiAdvisor {
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiAdvisor {
    /// Create a new `GeminiAdvisor`.
    ///
    /// # Arguments
    /// * `api_key`  — Gemini API key (sent as a header, never in query params).
    /// * `model`    — model id, e.g. `gemini-1.5-flash`.
    /// * `base_url` — normally `https://generativelanguage.googleapis.com`.
    pub fn new(
        api_key: &str,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured("advisory API key is empty"));
        }

        let mut key = HeaderValue::from_str(api_key.trim())
            .map_err(|_| ProviderError::NotConfigured("advisory API key is not a valid header"))?;
        key.set_sensitive(true);

        let mut default_headers = HeaderMap::new();
        default_headers.insert("x-goog-api-key", key);

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()?;

        let model = model.into();
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%model, %base_url, "GeminiAdvisor initialised");

        Ok(Self {
            model,
            base_url,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl AdvisoryProvider for GeminiAdvisor {
    #[instrument(skip(self, prompt), fields(model = %self.model), name = "gemini::advise")]
    async fn advise(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let resp = self.client.post(self.endpoint()).json(&body).send().await?;

        let status = resp.status();
        let raw = resp.text().await?;
        let body: Option<Value> = serde_json::from_str(&raw).ok();

        if !status.is_success() {
            let message = body
                .as_ref()
                .and_then(|b| b["error"]["message"].as_str())
                .map(str::to_string)
                .unwrap_or_else(|| fallback_message(status, &raw));
            return Err(ProviderError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                message,
            });
        }

        let body =
            body.ok_or_else(|| ProviderError::Malformed("advisory response is not JSON".to_string()))?;
        let text = extract_text(&body)?;
        debug!(chars = text.len(), "advice received");
        Ok(text)
    }
}

impl std::fmt::Debug for GeminiAdvisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAdvisor")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Join the text parts of the first candidate.
fn extract_text(body: &Value) -> Result<String, ProviderError> {
    let parts = body["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| {
            let reason = body["promptFeedback"]["blockReason"]
                .as_str()
                .unwrap_or("no candidates");
            ProviderError::Malformed(format!("response has no text ({reason})"))
        })?;

    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(ProviderError::Malformed("response text is empty".to_string()));
    }
    Ok(text)
}
