//! LINE webhook payload.
//!
//! Decoding is lenient: unknown fields are ignored and missing or `null` fields fall back
//! to empty strings, zero and false. Only malformed JSON is an error.

use serde::{Deserialize, Deserializer, Serialize};

/// `null` decodes to the type's default, like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Webhook request body: destination info plus zero or more events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookBody {
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    /// Bot user id the webhook was sent for.
    #[serde(deserialize_with = "null_as_default")]
    pub destination: String,
    #[serde(deserialize_with = "null_as_default")]
    pub events: Vec<WebhookEvent>,
}

/// One webhook event. Only `type == "message"` with a text message is acted on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub typ: String,
    #[serde(deserialize_with = "null_as_default")]
    pub message: EventMessage,
    #[serde(deserialize_with = "null_as_default")]
    pub webhook_event_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub delivery_context: DeliveryContext,
    /// Milliseconds since the Unix epoch.
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub source: EventSource,
    #[serde(deserialize_with = "null_as_default")]
    pub reply_token: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mode: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventMessage {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub typ: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub quote_token: String,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeliveryContext {
    #[serde(deserialize_with = "null_as_default")]
    pub is_redelivery: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub typ: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: String,
}

impl WebhookEvent {
    /// True for a user's text message, the only event the relay answers.
    pub fn is_text_message(&self) -> bool {
        self.typ == "message" && self.message.typ == "text"
    }
}

/// Parse a webhook body. Fails only when `raw` is not JSON of the expected shape.
/// A bare `null` is an empty body.
pub fn decode_webhook(raw: &str) -> Result<WebhookBody, serde_json::Error> {
    serde_json::from_str::<Option<WebhookBody>>(raw).map(Option::unwrap_or_default)
}
