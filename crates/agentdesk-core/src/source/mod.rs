//! Fragment sources: the producers of assistant text.
//!
//! A source turns a [`CompletionRequest`] into a lazy, finite stream of text
//! fragments. Failures travel inside the stream as `Err(UpstreamError)` so the
//! relay can turn them into frames instead of tearing down the transport.

pub mod simulated;

use std::pin::Pin;

use futures_util::Stream;

use agentdesk_types::conversation::{Message, Role};
use agentdesk_types::llm::{CompletionRequest, UpstreamError};

/// Seed used by the simulated generator when there is no user question.
pub const NO_QUESTION_PLACEHOLDER: &str = "(no question)";

/// Stream of text fragments produced by a source.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, UpstreamError>> + Send + 'static>>;

/// A remote model that can answer a completion request.
///
/// Object-safe so the relay can hold `Arc<dyn FragmentSource>`. `open` does
/// no I/O itself; the request is sent when the stream is first polled.
/// Implementations live in agentdesk-infra (e.g., `OpenAiCompatClient`).
pub trait FragmentSource: Send + Sync {
    /// Short name for logs (e.g., "openai_compat").
    fn name(&self) -> &str;

    fn open(&self, request: CompletionRequest) -> FragmentStream;
}

/// Which source answers a session. Chosen once, when the stream opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePlan {
    /// Forward to the upstream client with this model identifier.
    Upstream { model: String },
    /// Run the simulated generator with this question.
    Simulated { seed: String },
}

impl SourcePlan {
    /// Route on the agent's model key.
    ///
    /// A key that starts with one of `upstream_prefixes` (after trimming)
    /// goes upstream. Anything else, including an empty key, is simulated
    /// and seeded from the latest user message.
    pub fn select(model_key: &str, upstream_prefixes: &[String], history: &[Message]) -> Self {
        let key = model_key.trim();
        let upstream = !key.is_empty()
            && upstream_prefixes
                .iter()
                .filter(|p| !p.is_empty())
                .any(|p| key.starts_with(p.as_str()));

        if upstream {
            SourcePlan::Upstream {
                model: key.to_string(),
            }
        } else {
            SourcePlan::Simulated {
                seed: latest_question(history),
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SourcePlan::Upstream { .. } => "upstream",
            SourcePlan::Simulated { .. } => "simulated",
        }
    }
}

/// Content of the most recent user message, or the placeholder.
fn latest_question(history: &[Message]) -> String {
    history
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.trim())
        .filter(|c| !c.is_empty())
        .unwrap_or(NO_QUESTION_PLACEHOLDER)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentdesk_types::conversation::ConversationId;

    fn prefixes() -> Vec<String> {
        vec!["qwen".to_string()]
    }

    #[test]
    fn test_qwen_key_routes_upstream() {
        let plan = SourcePlan::select(" qwen-plus ", &prefixes(), &[]);
        assert_eq!(
            plan,
            SourcePlan::Upstream {
                model: "qwen-plus".into()
            }
        );
        assert_eq!(plan.kind(), "upstream");
    }

    #[test]
    fn test_other_keys_route_to_simulated() {
        let conv = ConversationId::new();
        let history = vec![Message::user(conv, "hi")];

        for key in ["local", "", "gpt-4o-mini", "Qwen-plus"] {
            assert_eq!(
                SourcePlan::select(key, &prefixes(), &history),
                SourcePlan::Simulated { seed: "hi".into() },
                "key {key:?}"
            );
        }
    }

    #[test]
    fn test_seed_is_latest_user_message() {
        let conv = ConversationId::new();
        let history = vec![
            Message::user(conv.clone(), "first"),
            Message::assistant(conv.clone(), "reply"),
            Message::user(conv.clone(), "second"),
            Message::assistant(conv, "another reply"),
        ];

        let plan = SourcePlan::select("local", &prefixes(), &history);
        assert_eq!(
            plan,
            SourcePlan::Simulated {
                seed: "second".into()
            }
        );
    }

    #[test]
    fn test_seed_placeholder_without_user_message() {
        let conv = ConversationId::new();
        let history = vec![Message::assistant(conv, "hello there")];

        let plan = SourcePlan::select("local", &prefixes(), &history);
        assert_eq!(
            plan,
            SourcePlan::Simulated {
                seed: NO_QUESTION_PLACEHOLDER.into()
            }
        );
    }

    #[test]
    fn test_empty_prefix_does_not_match_everything() {
        let plan = SourcePlan::select("local", &[String::new()], &[]);
        assert_eq!(plan.kind(), "simulated");
    }
}
