//! In-memory repositories for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;

use agentdesk_types::agent::{Agent, AgentId, DEFAULT_TEMPERATURE};
use agentdesk_types::conversation::{Conversation, ConversationId, Message};
use agentdesk_types::error::RepositoryError;

use crate::repository::agent::AgentRepository;
use crate::repository::conversation::ConversationRepository;

#[derive(Default)]
pub struct MemoryStore {
    agents: Mutex<HashMap<AgentId, Agent>>,
    conversations: Mutex<HashMap<ConversationId, Conversation>>,
    messages: Mutex<Vec<Message>>,
    /// Number of abort-flag reads served so far.
    pub abort_reads: AtomicUsize,
}

impl MemoryStore {
    pub fn aborted(&self, id: &ConversationId) -> bool {
        self.conversations.lock().unwrap()[id].aborted
    }
}

pub fn agent(model_key: &str) -> Agent {
    let now = Utc::now();
    Agent {
        id: AgentId::new(),
        name: "Tester".to_string(),
        description: "You are terse.".to_string(),
        model_key: model_key.to_string(),
        temperature: DEFAULT_TEMPERATURE,
        created_at: now,
        updated_at: now,
    }
}

impl AgentRepository for MemoryStore {
    async fn save(&self, agent: &Agent) -> Result<(), RepositoryError> {
        self.agents
            .lock()
            .unwrap()
            .insert(agent.id.clone(), agent.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &AgentId) -> Result<Option<Agent>, RepositoryError> {
        Ok(self.agents.lock().unwrap().get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Agent>, RepositoryError> {
        let mut agents: Vec<Agent> = self.agents.lock().unwrap().values().cloned().collect();
        agents.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(agents)
    }

    async fn delete(&self, id: &AgentId) -> Result<(), RepositoryError> {
        self.agents
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

impl ConversationRepository for MemoryStore {
    async fn create(&self, conversation: &Conversation) -> Result<(), RepositoryError> {
        self.conversations
            .lock()
            .unwrap()
            .insert(conversation.id.clone(), conversation.clone());
        Ok(())
    }

    async fn get_conversation(&self, id: &ConversationId) -> Result<Option<Conversation>, RepositoryError> {
        Ok(self.conversations.lock().unwrap().get(id).cloned())
    }

    async fn append_message(&self, message: &Message) -> Result<(), RepositoryError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn get_messages(&self, id: &ConversationId) -> Result<Vec<Message>, RepositoryError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.conversation_id == id)
            .cloned()
            .collect())
    }

    async fn is_aborted(&self, id: &ConversationId) -> Result<bool, RepositoryError> {
        self.abort_reads.fetch_add(1, Ordering::SeqCst);
        self.conversations
            .lock()
            .unwrap()
            .get(id)
            .map(|c| c.aborted)
            .ok_or(RepositoryError::NotFound)
    }

    async fn mark_aborted(&self, id: &ConversationId) -> Result<(), RepositoryError> {
        let mut conversations = self.conversations.lock().unwrap();
        let conv = conversations.get_mut(id).ok_or(RepositoryError::NotFound)?;
        conv.aborted = true;
        conv.updated_at = Utc::now();
        Ok(())
    }
}
