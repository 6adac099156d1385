//! Request handler: sequences the stages and maps every failure to an outcome.

use crate::channels::{
    decode_webhook, InboundEnvelope, MessageSegment, OutcomeResponse, ReplySender,
};
use crate::chunk::chunk_text;
use crate::config::{Config, Credentials};
use crate::llm::CompletionBackend;
use crate::relay::error::{RelayError, SUCCESS_BODY};
use std::sync::Arc;

/// Per-process relay knobs, copied out of `Config`.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub chunk_size: usize,
    pub steering_threshold: usize,
    pub fallback_reply: Option<String>,
}

impl RelaySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chunk_size: config.relay.chunk_size,
            steering_threshold: config.relay.steering_threshold,
            fallback_reply: config
                .relay
                .fallback_reply
                .clone()
                .filter(|s| !s.trim().is_empty()),
        }
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Prompt sent to the model: the steering instruction followed directly by the user's text.
pub fn steering_prompt(threshold: usize, user_text: &str) -> String {
    format!(
        "if your answer will be over {} characters, it must be submitted in multiple messages.{}",
        threshold, user_text
    )
}

/// Entry point for one inbound event. Cheap checks run before network calls:
/// decode, empty check, credentials, then completion, chunking and the reply.
pub struct RelayHandler {
    credentials: Credentials,
    settings: RelaySettings,
    completion: Arc<dyn CompletionBackend>,
    replier: Arc<dyn ReplySender>,
}

impl RelayHandler {
    pub fn new(
        credentials: Credentials,
        settings: RelaySettings,
        completion: Arc<dyn CompletionBackend>,
        replier: Arc<dyn ReplySender>,
    ) -> Self {
        Self {
            credentials,
            settings,
            completion,
            replier,
        }
    }

    /// Run the pipeline and always produce an outcome. Faults are logged with their cause,
    /// tagged with `invocation_id` so they line up with the trigger's own log lines.
    pub async fn invoke(
        &self,
        invocation_id: &str,
        envelope: &InboundEnvelope,
    ) -> OutcomeResponse {
        match self.handle(envelope).await {
            Ok(out) => out,
            Err(e) => {
                if e.status_code() >= 500 {
                    log::error!("{}", fault_line(invocation_id, &e));
                } else {
                    log::warn!("{}", fault_line(invocation_id, &e));
                }
                e.to_response()
            }
        }
    }

    /// Run the pipeline. `Err` carries the cause; `RelayError::to_response` gives the outcome.
    pub async fn handle(&self, envelope: &InboundEnvelope) -> Result<OutcomeResponse, RelayError> {
        log::debug!("relay: inbound event body: {}", envelope.body);

        let body = decode_webhook(&envelope.body).map_err(RelayError::Decode)?;

        let Some(event) = body.events.first() else {
            log::debug!("relay: webhook carried no events");
            return Ok(success());
        };
        if body.events.len() > 1 {
            log::warn!(
                "relay: webhook carried {} events, only the first is answered",
                body.events.len()
            );
        }
        if !event.is_text_message() {
            log::info!(
                "relay: ignoring {} event (message type {:?})",
                event.typ,
                event.message.typ
            );
            return Ok(success());
        }
        if event.delivery_context.is_redelivery {
            log::info!("relay: event {} is a redelivery", event.webhook_event_id);
        }

        if !has_value(self.credentials.openai_api_key.as_deref()) {
            return Err(RelayError::MissingOpenAiKey);
        }
        if !has_value(self.credentials.line_access_token.as_deref()) {
            return Err(RelayError::MissingLineToken);
        }

        let prompt = steering_prompt(self.settings.steering_threshold, &event.message.text);
        let answer = match self.completion.complete(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                self.send_fallback(&event.reply_token).await;
                return Err(RelayError::Completion(e));
            }
        };

        let segments: Vec<MessageSegment> = chunk_text(&answer, self.settings.chunk_size)
            .into_iter()
            .map(MessageSegment::text)
            .collect();
        if segments.is_empty() {
            log::warn!("relay: model returned an empty answer, nothing to reply");
            return Ok(success());
        }
        log::info!(
            "relay: replying with {} message(s) for {} character(s)",
            segments.len(),
            answer.chars().count()
        );

        self.replier
            .reply(&event.reply_token, segments)
            .await
            .map_err(RelayError::Reply)?;
        Ok(success())
    }

    /// Best effort: tell the user the model call failed. Failure here is only logged.
    async fn send_fallback(&self, reply_token: &str) {
        let Some(text) = self.settings.fallback_reply.as_deref() else {
            return;
        };
        if let Err(e) = self
            .replier
            .reply(reply_token, vec![MessageSegment::text(text)])
            .await
        {
            log::warn!("relay: fallback reply failed: {}", e);
        }
    }
}

/// Log line for a failed invocation: id first, then the full cause.
pub fn fault_line(invocation_id: &str, err: &RelayError) -> String {
    format!("invocation {}: {}", invocation_id, err)
}

fn has_value(secret: Option<&str>) -> bool {
    secret.is_some_and(|s| !s.trim().is_empty())
}

fn success() -> OutcomeResponse {
    OutcomeResponse::new(200, SUCCESS_BODY)
}
