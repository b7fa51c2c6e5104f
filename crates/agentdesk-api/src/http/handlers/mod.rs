//! HTTP request handlers, grouped by resource.

pub mod agent;
pub mod conversation;
pub mod model;
pub mod stream;

use agentdesk_types::agent::AgentId;
use agentdesk_types::conversation::ConversationId;
use agentdesk_types::error::{AgentError, ConversationError};

use crate::http::error::AppError;

/// Path ids that are not UUIDs cannot name a stored row.
pub(crate) fn parse_agent_id(raw: &str) -> Result<AgentId, AppError> {
    raw.parse().map_err(|_| AppError::Agent(AgentError::NotFound))
}

pub(crate) fn parse_conversation_id(raw: &str) -> Result<ConversationId, AppError> {
    raw.parse()
        .map_err(|_| AppError::Conversation(ConversationError::NotFound))
}
