//! Relay pipeline: decode the webhook, ask the model, chunk the answer, reply.
//!
//! One invocation runs the stages strictly in order and ends in exactly one
//! `OutcomeResponse`. Nothing is shared between invocations except immutable config
//! and the HTTP clients behind the collaborator traits.

mod error;
mod handler;

pub use error::{RelayError, SUCCESS_BODY};
pub use handler::{fault_line, steering_prompt, RelayHandler, RelaySettings};
