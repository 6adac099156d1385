//! LINE Messaging API channel.
//!
//! Inbound: the trigger envelope and the webhook payload it carries. Outbound: the
//! reply call that delivers an answer as one or more text messages.

mod event;
mod inbound;
mod line;
mod sender;

pub use event::{
    decode_webhook, DeliveryContext, EventMessage, EventSource, WebhookBody, WebhookEvent,
};
pub use inbound::{InboundEnvelope, OutcomeResponse};
pub use line::{LineChannel, ReplyEnvelope, LINE_REPLY_PATH};
pub use sender::{MessageSegment, ReplyError, ReplySender};
