//! Configuration types for agentdesk.
//!
//! `AppConfig` represents `config.toml` in the data directory. Every field
//! has a default, so an empty or missing file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::agent::ModelInfo;
use crate::llm::RetrievalMode;

/// Default OpenAI-compatible endpoint (DashScope compatible mode).
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";

/// Env var that overrides the upstream base URL.
pub const BASE_URL_ENV: &str = "QWEN_API_BASE";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Model catalogue served by `GET /api/v1/models`.
    #[serde(default = "default_models")]
    pub models: Vec<ModelInfo>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            relay: RelayConfig::default(),
            upstream: UpstreamConfig::default(),
            models: default_models(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Source routing and stream behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Model keys starting with any of these go to the upstream client.
    #[serde(default = "default_upstream_prefixes")]
    pub upstream_prefixes: Vec<String>,

    /// Append the assistant reply to history after a completed stream.
    #[serde(default)]
    pub persist_replies: bool,

    /// Pause between simulated fragments.
    #[serde(default = "default_simulated_delay_ms")]
    pub simulated_delay_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            upstream_prefixes: default_upstream_prefixes(),
            persist_replies: false,
            simulated_delay_ms: default_simulated_delay_ms(),
        }
    }
}

/// Upstream chat-completion client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL; `QWEN_API_BASE` takes precedence when set.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub mode: RetrievalMode,

    /// Slice size (in characters) for whole-response re-chunking.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_stream_timeout_secs")]
    pub stream_timeout_secs: u64,

    /// Credential env vars, highest priority first.
    #[serde(default = "default_credential_vars")]
    pub credential_vars: Vec<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            mode: RetrievalMode::default(),
            chunk_size: default_chunk_size(),
            request_timeout_secs: default_request_timeout_secs(),
            stream_timeout_secs: default_stream_timeout_secs(),
            credential_vars: default_credential_vars(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_upstream_prefixes() -> Vec<String> {
    vec!["qwen".to_string()]
}

fn default_simulated_delay_ms() -> u64 {
    300
}

fn default_chunk_size() -> usize {
    80
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_stream_timeout_secs() -> u64 {
    300
}

fn default_credential_vars() -> Vec<String> {
    vec!["DASHSCOPE_API_KEY".to_string(), "QWEN_API_KEY".to_string()]
}

fn default_models() -> Vec<ModelInfo> {
    let entry = |key: &str, label: &str, provider: &str, description: &str| ModelInfo {
        key: key.to_string(),
        label: label.to_string(),
        provider: provider.to_string(),
        description: description.to_string(),
    };

    vec![
        entry(
            "qwen-plus",
            "Qwen-Plus",
            "Qwen",
            "General-purpose Qwen model served through the upstream API.",
        ),
        entry(
            "deepseek-chat",
            "DeepSeek-Chat",
            "DeepSeek",
            "Conversational model; answered by the simulated generator unless routed upstream.",
        ),
        entry(
            "gpt-4o-mini",
            "GPT-4o-mini",
            "OpenAI",
            "Small multimodal model; answered by the simulated generator unless routed upstream.",
        ),
        entry(
            "local",
            "Local demo",
            "agentdesk",
            "Scripted Markdown reply for trying the stream without credentials.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.relay.upstream_prefixes, ["qwen"]);
        assert!(!config.relay.persist_replies);
        assert_eq!(config.relay.simulated_delay_ms, 300);
        assert_eq!(config.upstream.chunk_size, 80);
        assert_eq!(config.upstream.mode, RetrievalMode::Incremental);
        assert_eq!(
            config.upstream.credential_vars,
            ["DASHSCOPE_API_KEY", "QWEN_API_KEY"]
        );
        assert_eq!(config.models.len(), 4);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[upstream]
mode = "whole_response"
chunk_size = 16

[relay]
persist_replies = true
"#,
        )
        .unwrap();

        assert_eq!(config.upstream.mode, RetrievalMode::WholeResponse);
        assert_eq!(config.upstream.chunk_size, 16);
        assert_eq!(config.upstream.request_timeout_secs, 60);
        assert!(config.relay.persist_replies);
        assert_eq!(config.relay.simulated_delay_ms, 300);
    }

    #[test]
    fn test_models_table_replaces_catalogue() {
        let config: AppConfig = toml::from_str(
            r#"
[[models]]
key = "qwen-max"
label = "Qwen-Max"
provider = "Qwen"
"#,
        )
        .unwrap();

        assert_eq!(config.models.len(), 1);
        assert_eq!(config.models[0].key, "qwen-max");
        assert!(config.models[0].description.is_empty());
    }
}
