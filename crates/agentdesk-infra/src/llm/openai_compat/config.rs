//! Resolved settings for the OpenAI-compatible client.

use std::time::Duration;

use secrecy::SecretString;

use agentdesk_types::config::{BASE_URL_ENV, DEFAULT_UPSTREAM_BASE_URL, UpstreamConfig};
use agentdesk_types::error::ConfigurationError;
use agentdesk_types::llm::RetrievalMode;

use super::credentials::{VarLookup, resolve_credential};

/// Fully resolved client configuration. Built once at startup.
pub struct OpenAiCompatConfig {
    /// Base URL without trailing slash (e.g., ".../compatible-mode/v1").
    pub base_url: String,
    pub api_key: SecretString,
    /// Name of the variable the key was read from, for status output.
    pub credential_source: String,
    pub mode: RetrievalMode,
    pub chunk_size: usize,
    pub request_timeout: Duration,
    pub stream_timeout: Duration,
    pub connect_timeout: Duration,
}

impl OpenAiCompatConfig {
    /// Resolve credential and base URL from `lookup`, the rest from `upstream`.
    ///
    /// Base URL priority: `QWEN_API_BASE`, then `upstream.base_url`, then
    /// the DashScope compatible-mode default.
    pub fn resolve(
        upstream: &UpstreamConfig,
        lookup: &impl VarLookup,
    ) -> Result<Self, ConfigurationError> {
        let credential = resolve_credential(&upstream.credential_vars, lookup)?;
        let base_url = resolve_base_url(upstream, lookup)?;

        Ok(Self {
            base_url,
            api_key: credential.secret,
            credential_source: credential.source,
            mode: upstream.mode,
            chunk_size: upstream.chunk_size.max(1),
            request_timeout: Duration::from_secs(upstream.request_timeout_secs),
            stream_timeout: Duration::from_secs(upstream.stream_timeout_secs),
            connect_timeout: Duration::from_secs(10),
        })
    }
}

/// Effective base URL, validated and with any trailing `/` removed.
pub fn resolve_base_url(
    upstream: &UpstreamConfig,
    lookup: &impl VarLookup,
) -> Result<String, ConfigurationError> {
    let raw = lookup
        .var(BASE_URL_ENV)
        .filter(|v| !v.trim().is_empty())
        .or_else(|| upstream.base_url.clone())
        .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string());

    let url = raw.trim().trim_end_matches('/').to_string();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigurationError::InvalidBaseUrl(raw));
    }
    Ok(url)
}
