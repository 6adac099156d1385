//! Reply sender: the outbound half of a channel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One reply message. Order among segments is the order the user sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSegment {
    #[serde(rename = "type")]
    pub typ: String,
    pub text: String,
}

impl MessageSegment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            typ: "text".to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("reply access token not configured")]
    MissingToken,
    #[error("failed to marshal reply body: {0}")]
    Marshal(#[source] serde_json::Error),
    #[error("failed to create reply request: {0}")]
    Build(#[source] reqwest::Error),
    #[error("reply request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("reply api error: {status} {body}")]
    Api { status: u16, body: String },
}

/// Delivers an ordered set of segments as one reply. Implementations make exactly one
/// outbound call per invocation and never retry it.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn reply(&self, reply_token: &str, segments: Vec<MessageSegment>)
        -> Result<(), ReplyError>;
}
