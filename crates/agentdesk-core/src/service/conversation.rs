//! Conversation lifecycle: start, post, abort, and explicit reply recording.

use std::sync::Arc;

use agentdesk_types::agent::AgentId;
use agentdesk_types::conversation::{Conversation, ConversationDetail, ConversationId, Message};
use agentdesk_types::error::ConversationError;

use crate::repository::agent::AgentRepository;
use crate::repository::conversation::ConversationRepository;

pub struct ConversationService<A: AgentRepository, C: ConversationRepository> {
    agents: Arc<A>,
    conversations: Arc<C>,
}

impl<A: AgentRepository, C: ConversationRepository> ConversationService<A, C> {
    pub fn new(agents: Arc<A>, conversations: Arc<C>) -> Self {
        Self {
            agents,
            conversations,
        }
    }

    /// Start an empty conversation with an existing agent.
    pub async fn start(&self, agent_id: &AgentId) -> Result<Conversation, ConversationError> {
        self.agents
            .get_by_id(agent_id)
            .await
            .map_err(|e| ConversationError::StorageError(e.to_string()))?
            .ok_or(ConversationError::AgentNotFound)?;

        let conversation = Conversation::new(agent_id.clone());
        self.conversations.create(&conversation).await?;
        tracing::info!(conversation.id = %conversation.id, agent.id = %agent_id, "conversation started");

        Ok(conversation)
    }

    /// The conversation and its full history in creation order.
    pub async fn detail(&self, id: &ConversationId) -> Result<ConversationDetail, ConversationError> {
        let conversation = self.require(id).await?;
        let history = self.conversations.get_messages(id).await?;
        Ok(ConversationDetail {
            conversation,
            history,
        })
    }

    /// Store a user message. Content is trimmed and must not be empty.
    pub async fn post_user_message(
        &self,
        id: &ConversationId,
        content: &str,
    ) -> Result<Message, ConversationError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ConversationError::EmptyContent);
        }
        self.require(id).await?;

        let message = Message::user(id.clone(), content);
        self.conversations.append_message(&message).await?;
        Ok(message)
    }

    /// Set the sticky abort flag; any active stream ends at its next poll.
    pub async fn abort(&self, id: &ConversationId) -> Result<(), ConversationError> {
        self.conversations.mark_aborted(id).await?;
        tracing::info!(conversation.id = %id, "abort requested");
        Ok(())
    }

    /// Append an assistant reply to history.
    ///
    /// The relay never does this on its own unless `persist_replies` is on;
    /// clients that want history to include replies call this after a
    /// stream completes. Content is stored as-is (not trimmed).
    pub async fn record_reply(
        &self,
        id: &ConversationId,
        content: &str,
    ) -> Result<Message, ConversationError> {
        if content.trim().is_empty() {
            return Err(ConversationError::EmptyContent);
        }
        self.require(id).await?;

        let message = Message::assistant(id.clone(), content);
        self.conversations.append_message(&message).await?;
        Ok(message)
    }

    async fn require(&self, id: &ConversationId) -> Result<Conversation, ConversationError> {
        self.conversations
            .get_conversation(id)
            .await?
            .ok_or(ConversationError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentdesk_types::conversation::Role;

    use crate::testing::{MemoryStore, agent};

    async fn setup() -> (Arc<MemoryStore>, ConversationService<MemoryStore, MemoryStore>, AgentId) {
        let store = Arc::new(MemoryStore::default());
        let agent = agent("local");
        AgentRepository::save(store.as_ref(), &agent).await.unwrap();
        let svc = ConversationService::new(Arc::clone(&store), Arc::clone(&store));
        (store, svc, agent.id)
    }

    #[tokio::test]
    async fn test_start_requires_existing_agent() {
        let (_, svc, _) = setup().await;
        let err = svc.start(&AgentId::new()).await.unwrap_err();
        assert!(matches!(err, ConversationError::AgentNotFound));
    }

    #[tokio::test]
    async fn test_post_trims_and_appends_in_order() {
        let (_, svc, agent_id) = setup().await;
        let conv = svc.start(&agent_id).await.unwrap();

        svc.post_user_message(&conv.id, "  first  ").await.unwrap();
        svc.record_reply(&conv.id, "answer\n").await.unwrap();
        svc.post_user_message(&conv.id, "second").await.unwrap();

        let detail = svc.detail(&conv.id).await.unwrap();
        let history: Vec<(Role, &str)> = detail
            .history
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            history,
            [
                (Role::User, "first"),
                (Role::Assistant, "answer\n"),
                (Role::User, "second")
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_content_rejected() {
        let (_, svc, agent_id) = setup().await;
        let conv = svc.start(&agent_id).await.unwrap();

        assert!(matches!(
            svc.post_user_message(&conv.id, " \n\t").await,
            Err(ConversationError::EmptyContent)
        ));
        assert!(matches!(
            svc.record_reply(&conv.id, "").await,
            Err(ConversationError::EmptyContent)
        ));
    }

    #[tokio::test]
    async fn test_post_to_unknown_conversation_is_not_found() {
        let (_, svc, _) = setup().await;
        let err = svc
            .post_user_message(&ConversationId::new(), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, ConversationError::NotFound));
    }

    #[tokio::test]
    async fn test_abort_is_sticky_and_idempotent() {
        let (store, svc, agent_id) = setup().await;
        let conv = svc.start(&agent_id).await.unwrap();

        svc.abort(&conv.id).await.unwrap();
        svc.abort(&conv.id).await.unwrap();

        assert!(store.aborted(&conv.id));
        assert!(svc.detail(&conv.id).await.unwrap().conversation.aborted);
        assert!(matches!(
            svc.abort(&ConversationId::new()).await,
            Err(ConversationError::NotFound)
        ));
    }
}
