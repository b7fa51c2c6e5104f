//! Request and error types for the upstream chat-completion model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::conversation::Message;

/// Role of an entry in an upstream chat-completion payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A role/content pair in a completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Everything a fragment source needs to produce a reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    /// System prompt; sent as a leading `system` entry when non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Conversation history in creation order.
    pub messages: Vec<ChatMessage>,
    /// Forwarded verbatim, no range check.
    pub temperature: f64,
}

impl CompletionRequest {
    /// Build a request from stored history. Order is preserved.
    pub fn from_history(
        model: impl Into<String>,
        system_prompt: &str,
        history: &[Message],
        temperature: f64,
    ) -> Self {
        let system = if system_prompt.trim().is_empty() {
            None
        } else {
            Some(system_prompt.to_string())
        };

        Self {
            model: model.into(),
            system,
            messages: history
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.into(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature,
        }
    }
}

/// How the upstream client retrieves a reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
    /// Server-sent deltas forwarded as they arrive.
    #[default]
    Incremental,
    /// One blocking request, then local re-chunking.
    WholeResponse,
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalMode::Incremental => write!(f, "incremental"),
            RetrievalMode::WholeResponse => write!(f, "whole_response"),
        }
    }
}

impl FromStr for RetrievalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "incremental" | "stream" => Ok(RetrievalMode::Incremental),
            "whole_response" | "whole" => Ok(RetrievalMode::WholeResponse),
            other => Err(format!("invalid retrieval mode: '{other}'")),
        }
    }
}

/// Failure talking to the upstream model.
///
/// These never escape a stream: the relay turns them into an error fragment.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("authentication failed (HTTP {status})")]
    AuthenticationFailed { status: u16 },

    #[error("rate limited by upstream")]
    RateLimited,

    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("response has no choices[0].message.content")]
    MissingContent,

    #[error("response content is empty")]
    EmptyContent,

    #[error("stream interrupted: {0}")]
    Stream(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{ConversationId, Message};

    #[test]
    fn test_from_history_keeps_order_and_roles() {
        let conv = ConversationId::new();
        let history = vec![
            Message::user(conv.clone(), "one"),
            Message::assistant(conv.clone(), "two"),
            Message::user(conv, "three"),
        ];

        let req = CompletionRequest::from_history("qwen-plus", "Be brief.", &history, 0.2);

        assert_eq!(req.system.as_deref(), Some("Be brief."));
        let contents: Vec<&str> = req.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["one", "two", "three"]);
        assert_eq!(req.messages[1].role, MessageRole::Assistant);
        assert_eq!(req.temperature, 0.2);
    }

    #[test]
    fn test_blank_system_prompt_is_dropped() {
        let req = CompletionRequest::from_history("m", "   ", &[], 0.7);
        assert!(req.system.is_none());
    }

    #[test]
    fn test_retrieval_mode_parse() {
        assert_eq!(
            "whole-response".parse::<RetrievalMode>().unwrap(),
            RetrievalMode::WholeResponse
        );
        assert_eq!(
            "incremental".parse::<RetrievalMode>().unwrap(),
            RetrievalMode::Incremental
        );
        assert!("batch".parse::<RetrievalMode>().is_err());
        assert_eq!(RetrievalMode::default(), RetrievalMode::Incremental);
    }

    #[test]
    fn test_upstream_error_display_names_status() {
        let err = UpstreamError::Status {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "upstream returned HTTP 502: bad gateway");
    }
}
