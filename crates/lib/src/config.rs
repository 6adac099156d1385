//! Configuration types and loading.
//!
//! Config is loaded once per process from a JSON file (e.g. `~/.replybot/config.json`)
//! and the environment. Secrets may live in either; the environment wins.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Longest text a single LINE text message may carry. Upper bound for `relay.chunkSize`.
pub const LINE_MAX_TEXT_CHARS: usize = 5000;

/// Default segment length, in characters, for one reply message.
pub const DEFAULT_CHUNK_SIZE: usize = 300;

/// Default answer length the model is told to stay under per message.
pub const DEFAULT_STEERING_THRESHOLD: usize = 1500;

const DEFAULT_FALLBACK_REPLY: &str =
    "Sorry, the assistant is temporarily unavailable. Please try again later.";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Completion service settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// LINE reply settings.
    #[serde(default)]
    pub line: LineConfig,

    /// Chunking and prompt settings.
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 15151).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    15151
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// OpenAI chat completion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiConfig {
    /// API key. Overridden by OPENAI_API_KEY env when set.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model id sent with every request (default "gpt-4").
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// API base including the version segment (default "https://api.openai.com/v1").
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

fn default_openai_model() -> String {
    "gpt-4".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_openai_model(),
            base_url: default_openai_base_url(),
        }
    }
}

/// LINE Messaging API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    /// Channel access token. Overridden by LINE_ACCESS_TOKEN env when set.
    #[serde(default)]
    pub access_token: Option<String>,

    /// API root without path (default "https://api.line.me").
    #[serde(default = "default_line_api_base")]
    pub api_base: String,

    /// Timeout for the reply call in seconds (default 10).
    #[serde(default = "default_reply_timeout_secs")]
    pub reply_timeout_secs: u64,
}

fn default_line_api_base() -> String {
    "https://api.line.me".to_string()
}

fn default_reply_timeout_secs() -> u64 {
    10
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            api_base: default_line_api_base(),
            reply_timeout_secs: default_reply_timeout_secs(),
        }
    }
}

impl LineConfig {
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs)
    }
}

/// How answers are requested and split.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayConfig {
    /// Characters per reply message (default 300, at most LINE_MAX_TEXT_CHARS).
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Length quoted to the model in the steering instruction (default 1500).
    #[serde(default = "default_steering_threshold")]
    pub steering_threshold: usize,

    /// Text sent to the user when the completion call fails. `null` disables it.
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: Option<String>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_steering_threshold() -> usize {
    DEFAULT_STEERING_THRESHOLD
}

fn default_fallback_reply() -> Option<String> {
    Some(DEFAULT_FALLBACK_REPLY.to_string())
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            steering_threshold: default_steering_threshold(),
            fallback_reply: default_fallback_reply(),
        }
    }
}

impl Config {
    /// Reject settings the pipeline cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.relay.chunk_size == 0 {
            anyhow::bail!("relay.chunkSize must be at least 1");
        }
        if self.relay.chunk_size > LINE_MAX_TEXT_CHARS {
            anyhow::bail!(
                "relay.chunkSize {} exceeds the LINE text message limit of {} characters",
                self.relay.chunk_size,
                LINE_MAX_TEXT_CHARS
            );
        }
        if self.line.reply_timeout_secs == 0 {
            anyhow::bail!("line.replyTimeoutSecs must be at least 1");
        }
        Ok(())
    }
}

/// Credentials resolved once at startup. Presence is checked per request.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub line_access_token: Option<String>,
}

impl Credentials {
    pub fn resolve(config: &Config) -> Self {
        Self {
            openai_api_key: resolve_openai_api_key(config),
            line_access_token: resolve_line_access_token(config),
        }
    }
}

/// Env value wins when non-empty; otherwise the trimmed config value when non-empty.
fn pick_secret(env_value: Option<String>, config_value: Option<&String>) -> Option<String> {
    env_value
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config_value
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve the OpenAI API key: env OPENAI_API_KEY overrides config.
pub fn resolve_openai_api_key(config: &Config) -> Option<String> {
    pick_secret(
        std::env::var("OPENAI_API_KEY").ok(),
        config.openai.api_key.as_ref(),
    )
}

/// Resolve the LINE channel access token: env LINE_ACCESS_TOKEN overrides config.
pub fn resolve_line_access_token(config: &Config) -> Option<String> {
    pick_secret(
        std::env::var("LINE_ACCESS_TOKEN").ok(),
        config.line.access_token.as_ref(),
    )
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("REPLYBOT_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".replybot").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, REPLYBOT_CONFIG_PATH, or the default. Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    config
        .validate()
        .with_context(|| format!("validating config from {}", path.display()))?;
    Ok((config, path))
}
