//! Agent repository trait definition.

use agentdesk_types::agent::{Agent, AgentId};
use agentdesk_types::error::RepositoryError;

/// Repository trait for agent persistence.
///
/// Implementations live in agentdesk-infra (e.g., SqliteAgentRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait AgentRepository: Send + Sync {
    /// Insert or replace an agent by ID.
    fn save(&self, agent: &Agent)
    -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &AgentId,
    ) -> impl std::future::Future<Output = Result<Option<Agent>, RepositoryError>> + Send;

    /// All agents, most recently updated first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Agent>, RepositoryError>> + Send;

    /// Delete an agent and, by cascade, its conversations.
    /// Returns `RepositoryError::NotFound` if no such agent exists.
    fn delete(
        &self,
        id: &AgentId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
