//! LLM abstraction and the OpenAI chat completion client.
//!
//! The relay only needs one thing from a model: the full answer to a single user prompt.

mod openai;

use async_trait::async_trait;

pub use openai::OpenAiClient;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("openai api key not configured")]
    MissingApiKey,
    #[error("openai request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("openai api error: {0}")]
    Api(String),
    #[error("openai returned no choices")]
    EmptyChoices,
}

/// A completion service: one prompt in, one generated text out. No streaming, no retry.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
