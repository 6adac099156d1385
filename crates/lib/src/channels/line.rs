//! LINE channel: reply to a webhook event via the Messaging API reply endpoint.

use crate::channels::sender::{MessageSegment, ReplyError, ReplySender};
use crate::config::{Credentials, LineConfig};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const LINE_REPLY_PATH: &str = "/v2/bot/message/reply";

/// Reply request body: the event's reply token and the messages to send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyEnvelope {
    pub reply_token: String,
    pub messages: Vec<MessageSegment>,
}

/// LINE reply connector. One POST per reply, bounded by an explicit timeout.
pub struct LineChannel {
    api_base: String,
    access_token: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl LineChannel {
    pub fn new(api_base: Option<String>, access_token: Option<String>, timeout: Duration) -> Self {
        let api_base = api_base
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| "https://api.line.me".to_string());
        Self {
            api_base,
            access_token: access_token.filter(|t| !t.trim().is_empty()),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(line: &LineConfig, credentials: &Credentials) -> Self {
        Self::new(
            Some(line.api_base.clone()),
            credentials.line_access_token.clone(),
            line.reply_timeout(),
        )
    }

    fn reply_url(&self) -> String {
        format!("{}{}", self.api_base, LINE_REPLY_PATH)
    }

    /// POST the envelope to the reply endpoint. Any non-2xx status is an error.
    pub async fn send_reply(&self, envelope: &ReplyEnvelope) -> Result<(), ReplyError> {
        let token = self.access_token.as_ref().ok_or(ReplyError::MissingToken)?;
        let body = serde_json::to_vec(envelope).map_err(ReplyError::Marshal)?;
        let req = self
            .client
            .post(self.reply_url())
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(token)
            .timeout(self.timeout)
            .body(body)
            .build()
            .map_err(ReplyError::Build)?;
        let res = self.client.execute(req).await.map_err(ReplyError::Request)?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ReplyError::Api { status, body });
        }
        log::debug!("line reply delivered: {} message(s)", envelope.messages.len());
        Ok(())
    }
}

#[async_trait]
impl ReplySender for LineChannel {
    async fn reply(
        &self,
        reply_token: &str,
        segments: Vec<MessageSegment>,
    ) -> Result<(), ReplyError> {
        let envelope = ReplyEnvelope {
            reply_token: reply_token.to_string(),
            messages: segments,
        };
        self.send_reply(&envelope).await
    }
}
