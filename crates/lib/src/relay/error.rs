//! Pipeline faults and their fixed `(status, body)` mapping.

use crate::channels::{OutcomeResponse, ReplyError};
use crate::llm::LlmError;

pub const SUCCESS_BODY: &str = r#"{"msg": "success"}"#;

/// Every way an invocation can fail. The `Display` form carries the cause for logs;
/// `body()` is what crosses the boundary.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("invalid webhook body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("OPENAI_API_KEY is not set")]
    MissingOpenAiKey,
    #[error("LINE_ACCESS_TOKEN is not set")]
    MissingLineToken,
    #[error("failed to call openai api: {0}")]
    Completion(#[source] LlmError),
    #[error("failed to send reply: {0}")]
    Reply(#[source] ReplyError),
}

impl RelayError {
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::Decode(_) => 400,
            _ => 500,
        }
    }

    /// Fixed JSON body for this fault. Names the failing stage, never the cause.
    pub fn body(&self) -> &'static str {
        match self {
            RelayError::Decode(_) => r#"{"msg": "error reading body, invalid JSON"}"#,
            RelayError::MissingOpenAiKey => r#"{"msg": "OPENAI_API_KEY is not set"}"#,
            RelayError::MissingLineToken => r#"{"msg": "LINE_ACCESS_TOKEN is not set"}"#,
            RelayError::Completion(_) => r#"{"msg": "failed to call openai api"}"#,
            RelayError::Reply(e) => match e {
                ReplyError::MissingToken => r#"{"msg": "LINE_ACCESS_TOKEN is not set"}"#,
                ReplyError::Marshal(_) => r#"{"msg": "failed to marshal response body"}"#,
                ReplyError::Build(_) => r#"{"msg": "failed to create request"}"#,
                ReplyError::Request(_) => r#"{"msg": "failed to request"}"#,
                ReplyError::Api { .. } => r#"{"msg": "reply api returned an error"}"#,
            },
        }
    }

    pub fn to_response(&self) -> OutcomeResponse {
        OutcomeResponse::new(self.status_code(), self.body())
    }
}
