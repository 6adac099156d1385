//! Trigger payloads: what an invocation receives and what it hands back.

use serde::{Deserialize, Serialize};

/// One invocation's input: the raw webhook body as a string plus whatever else the
/// trigger attached (kept as-is, never interpreted).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundEnvelope {
    #[serde(default)]
    pub body: String,
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl InboundEnvelope {
    pub fn from_body(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            metadata: serde_json::Map::new(),
        }
    }
}

/// One invocation's result: a status code and a fixed JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeResponse {
    pub status_code: u16,
    pub body: String,
}

impl OutcomeResponse {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
