// =============================================================================
// Advisory Collaborator
// =============================================================================
//
// Turns an `AdvisoryContext` into a prompt and sends it to a hosted language
// model. The reply is opaque text and is shown verbatim by the display layer.

pub mod gemini;
pub mod prompt;

use async_trait::async_trait;

use crate::types::ProviderError;

pub use gemini::GeminiAdvisor;
pub use prompt::build_prompt;

/// Hosted text-generation service that answers an advisory prompt.
#[async_trait]
pub trait AdvisoryProvider: Send + Sync {
    async fn advise(&self, prompt: &str) -> Result<String, ProviderError>;
}
