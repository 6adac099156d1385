//! Gateway HTTP server (single port).

use crate::channels::{InboundEnvelope, LineChannel, OutcomeResponse};
use crate::config::{self, Config, Credentials};
use crate::llm::OpenAiClient;
use crate::relay::{fault_line, RelayError, RelayHandler, RelaySettings};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared state for the gateway: immutable config and the relay handler.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub handler: Arc<RelayHandler>,
}

/// Build the relay handler from config: resolve credentials once, construct both clients.
/// Missing credentials are reported here but only enforced per request.
pub fn build_handler(config: &Config) -> RelayHandler {
    let credentials = Credentials::resolve(config);
    if credentials.openai_api_key.is_none() {
        log::warn!("OPENAI_API_KEY is not set; message events will fail until it is");
    }
    if credentials.line_access_token.is_none() {
        log::warn!("LINE_ACCESS_TOKEN is not set; message events will fail until it is");
    }
    let completion = Arc::new(OpenAiClient::from_config(&config.openai, &credentials));
    log::info!("completion model: {}", completion.model());
    let replier = Arc::new(LineChannel::from_config(&config.line, &credentials));
    RelayHandler::new(
        credentials,
        RelaySettings::from_config(config),
        completion,
        replier,
    )
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/invoke", post(invoke_http))
        .route("/webhook", post(webhook_http))
        .with_state(state)
}

pub async fn run_gateway(config: Config) -> Result<()> {
    config.validate().context("invalid configuration")?;
    let bind = config.gateway.bind.trim().to_string();
    if !config::is_loopback_bind(&bind) {
        log::warn!(
            "gateway bound to {} without webhook signature verification; put it behind a trusted proxy",
            bind
        );
    }

    let handler = Arc::new(build_handler(&config));
    let state = GatewayState {
        config: Arc::new(config.clone()),
        handler,
    };
    let app = router(state);

    let bind_addr = format!("{}:{}", bind, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
/// In-flight invocations finish before the server returns.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining in-flight invocations");
}

/// POST /invoke — function-style trigger. The HTTP status is always 200; the outcome is in the JSON.
async fn invoke_http(State(state): State<GatewayState>, body: Bytes) -> Json<OutcomeResponse> {
    let invocation_id = uuid::Uuid::new_v4().to_string();
    let out = match serde_json::from_slice::<InboundEnvelope>(&body) {
        Ok(envelope) => state.handler.invoke(&invocation_id, &envelope).await,
        Err(e) => {
            let err = RelayError::Decode(e);
            log::warn!("{}", fault_line(&invocation_id, &err));
            err.to_response()
        }
    };
    log::info!("invocation {}: status {}", invocation_id, out.status_code);
    Json(out)
}

/// POST /webhook — raw LINE webhook body; the outcome becomes the HTTP response.
async fn webhook_http(State(state): State<GatewayState>, body: Bytes) -> impl IntoResponse {
    let invocation_id = uuid::Uuid::new_v4().to_string();
    let envelope = InboundEnvelope::from_body(String::from_utf8_lossy(&body));
    let out = state.handler.invoke(&invocation_id, &envelope).await;
    log::info!("invocation {}: status {}", invocation_id, out.status_code);
    let status = StatusCode::from_u16(out.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        out.body,
    )
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
    }))
}
