//! OpenAI client: POST {base}/chat/completions with a single user message.

use crate::config::{Credentials, OpenAiConfig};
use crate::llm::{CompletionBackend, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for the OpenAI chat completions API. Uses the transport's default timeout.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(
        base_url: Option<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(openai: &OpenAiConfig, credentials: &Credentials) -> Self {
        Self::new(
            Some(openai.base_url.clone()),
            credentials.openai_api_key.clone(),
            openai.model.clone(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// POST /chat/completions — non-streaming, one user message. Returns the first choice's content.
    pub async fn chat(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_ref().ok_or(LlmError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::User { content: prompt }],
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("{} {}", status, body)));
        }
        let data: ChatResponse = res.json().await?;
        first_choice_content(data)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.chat(prompt).await
    }
}

// --- wire types ---

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
enum ChatMessage<'a> {
    User { content: &'a str },
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn first_choice_content(data: ChatResponse) -> Result<String, LlmError> {
    let choice = data
        .choices
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyChoices)?;
    Ok(choice.message.and_then(|m| m.content).unwrap_or_default())
}
