//! Agent management service.

use std::sync::Arc;

use chrono::Utc;

use agentdesk_types::agent::{Agent, AgentId, DEFAULT_TEMPERATURE, UpsertAgentRequest};
use agentdesk_types::error::AgentError;

use crate::repository::agent::AgentRepository;

/// Longest accepted agent name.
pub const MAX_NAME_CHARS: usize = 100;

/// Result of an upsert: the stored agent and whether it was newly created.
#[derive(Debug, Clone)]
pub struct Upserted {
    pub agent: Agent,
    pub created: bool,
}

pub struct AgentService<A: AgentRepository> {
    repo: Arc<A>,
}

impl<A: AgentRepository> AgentService<A> {
    pub fn new(repo: Arc<A>) -> Self {
        Self { repo }
    }

    /// Create an agent, or update one in place when `request.id` names a
    /// stored agent. An unknown `id` creates a new agent with a fresh id.
    ///
    /// The name is trimmed and may be empty, but not longer than
    /// [`MAX_NAME_CHARS`]. Unset optional fields fall back to the stored
    /// value on update and to defaults on create (empty description, empty
    /// model key, 0.7).
    pub async fn upsert(&self, request: UpsertAgentRequest) -> Result<Upserted, AgentError> {
        let name = request.name.trim().to_string();
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(AgentError::InvalidName(format!(
                "name must be at most {MAX_NAME_CHARS} characters"
            )));
        }

        let existing = match &request.id {
            Some(id) => self.repo.get_by_id(id).await?,
            None => None,
        };

        let now = Utc::now();
        let (agent, created) = match existing {
            Some(existing) => {
                let agent = Agent {
                    name,
                    description: request.description.unwrap_or(existing.description),
                    model_key: request.model_key.unwrap_or(existing.model_key),
                    temperature: request.temperature.unwrap_or(existing.temperature),
                    updated_at: now,
                    ..existing
                };
                (agent, false)
            }
            None => {
                if let Some(stale) = &request.id {
                    tracing::debug!(agent.id = %stale, "unknown agent id on upsert, creating new agent");
                }
                let agent = Agent {
                    id: AgentId::new(),
                    name,
                    description: request.description.unwrap_or_default(),
                    model_key: request.model_key.unwrap_or_default(),
                    temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                    created_at: now,
                    updated_at: now,
                };
                (agent, true)
            }
        };

        self.repo.save(&agent).await?;
        tracing::info!(agent.id = %agent.id, created, model_key = %agent.model_key, "agent saved");

        Ok(Upserted { agent, created })
    }

    pub async fn get(&self, id: &AgentId) -> Result<Agent, AgentError> {
        self.repo.get_by_id(id).await?.ok_or(AgentError::NotFound)
    }

    pub async fn list(&self) -> Result<Vec<Agent>, AgentError> {
        Ok(self.repo.list().await?)
    }

    pub async fn delete(&self, id: &AgentId) -> Result<(), AgentError> {
        self.repo.delete(id).await?;
        tracing::info!(agent.id = %id, "agent deleted");
        Ok(())
    }
}
