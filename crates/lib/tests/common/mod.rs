//! In-process stand-ins for the OpenAI and LINE APIs, plus a gateway launcher.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use lib::config::Config;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the fake completion endpoint answers.
#[derive(Clone)]
pub enum CompletionReply {
    Text(String),
    NoChoices,
    Status(u16),
}

/// Recorded traffic and canned answers for one test.
#[derive(Clone)]
pub struct Upstream {
    pub completion_reply: CompletionReply,
    pub reply_status: u16,
    pub reply_delay: Duration,
    pub completions: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    pub replies: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

impl Upstream {
    pub fn answering(text: impl Into<String>) -> Self {
        Self {
            completion_reply: CompletionReply::Text(text.into()),
            reply_status: 200,
            reply_delay: Duration::ZERO,
            completions: Arc::default(),
            replies: Arc::default(),
        }
    }

    pub fn completion_calls(&self) -> Vec<(Option<String>, Value)> {
        self.completions.lock().unwrap().clone()
    }

    pub fn reply_calls(&self) -> Vec<(Option<String>, Value)> {
        self.replies.lock().unwrap().clone()
    }

    /// Serve both fake APIs on one ephemeral port. Returns its address.
    pub async fn spawn(&self) -> SocketAddr {
        let app = Router::new()
            .route("/v1/chat/completions", post(fake_completion))
            .route("/v2/bot/message/reply", post(fake_reply))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind upstream");
        let addr = listener.local_addr().expect("upstream addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        addr
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

async fn fake_completion(
    State(up): State<Upstream>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    up.completions
        .lock()
        .unwrap()
        .push((bearer(&headers), body));
    match &up.completion_reply {
        CompletionReply::Text(t) => (
            StatusCode::OK,
            Json(json!({
                "id": "chatcmpl-test",
                "object": "chat.completion",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": t}, "finish_reason": "stop"}]
            })),
        ),
        CompletionReply::NoChoices => (StatusCode::OK, Json(json!({"choices": []}))),
        CompletionReply::Status(code) => (
            StatusCode::from_u16(*code).unwrap(),
            Json(json!({"error": {"message": "upstream failure"}})),
        ),
    }
}

async fn fake_reply(
    State(up): State<Upstream>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    up.replies.lock().unwrap().push((bearer(&headers), body));
    if !up.reply_delay.is_zero() {
        tokio::time::sleep(up.reply_delay).await;
    }
    let status = StatusCode::from_u16(up.reply_status).unwrap();
    if status.is_success() {
        (status, Json(json!({})))
    } else {
        (status, Json(json!({"message": "Invalid reply token"})))
    }
}

pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

/// Config pointing both clients at `upstream`, with credentials set.
pub fn config_for(upstream: SocketAddr) -> Config {
    let mut config = Config::default();
    config.openai.base_url = format!("http://{}/v1", upstream);
    config.openai.api_key = Some("sk-test".to_string());
    config.line.api_base = format!("http://{}", upstream);
    config.line.access_token = Some("line-test".to_string());
    config
}

/// Start the gateway on a free port and wait until GET / answers. Returns its base URL.
pub async fn spawn_gateway(mut config: Config) -> String {
    let port = free_port();
    config.gateway.port = port;
    config.gateway.bind = "127.0.0.1".to_string();
    tokio::spawn(async move {
        let _ = lib::gateway::run_gateway(config).await;
    });

    let base = format!("http://127.0.0.1:{}", port);
    let client = reqwest::Client::new();
    for _ in 0..100 {
        if let Ok(resp) = client.get(&base).send().await {
            if resp.status().is_success() {
                return base;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("gateway at {} did not become healthy within 5s", base);
}

/// A LINE webhook body with one text message event.
pub fn webhook_body(text: &str) -> String {
    json!({
        "destination": "Ubot",
        "events": [{
            "type": "message",
            "message": {"type": "text", "id": "468789577898262530", "quoteToken": "q3Plxr4AgKd", "text": text},
            "webhookEventId": "01H810YECXQQZ37VAXPF6H9E6T",
            "deliveryContext": {"isRedelivery": false},
            "timestamp": 1692251666727i64,
            "source": {"type": "user", "userId": "U4af4980629"},
            "replyToken": "38ef843bde154d9b91c21320ffd17a0f",
            "mode": "active"
        }]
    })
    .to_string()
}
