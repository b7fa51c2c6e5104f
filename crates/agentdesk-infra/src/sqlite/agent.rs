//! SQLite implementation of [`AgentRepository`].

use sqlx::Row;
use uuid::Uuid;

use agentdesk_core::repository::agent::AgentRepository;
use agentdesk_types::agent::{Agent, AgentId};
use agentdesk_types::error::RepositoryError;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

#[derive(Clone)]
pub struct SqliteAgentRepository {
    pool: DatabasePool,
}

impl SqliteAgentRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to [`Agent`].
struct AgentRow {
    id: String,
    name: String,
    description: String,
    model_key: String,
    temperature: f64,
    created_at: String,
    updated_at: String,
}

impl AgentRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            model_key: row.try_get("model_key")?,
            temperature: row.try_get("temperature")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_agent(self) -> Result<Agent, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid agent id: {e}")))?;

        Ok(Agent {
            id: AgentId::from_uuid(id),
            name: self.name,
            description: self.description,
            model_key: self.model_key,
            temperature: self.temperature,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

impl AgentRepository for SqliteAgentRepository {
    async fn save(&self, agent: &Agent) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO agents (id, name, description, model_key, temperature, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   name = excluded.name,
                   description = excluded.description,
                   model_key = excluded.model_key,
                   temperature = excluded.temperature,
                   updated_at = excluded.updated_at"#,
        )
        .bind(agent.id.to_string())
        .bind(&agent.name)
        .bind(&agent.description)
        .bind(&agent.model_key)
        .bind(agent.temperature)
        .bind(format_datetime(&agent.created_at))
        .bind(format_datetime(&agent.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn get_by_id(&self, id: &AgentId) -> Result<Option<Agent>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM agents WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let agent_row = AgentRow::from_row(&row).map_err(query_error)?;
                Ok(Some(agent_row.into_agent()?))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Agent>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM agents ORDER BY updated_at DESC, id DESC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| {
                AgentRow::from_row(row)
                    .map_err(query_error)
                    .and_then(AgentRow::into_agent)
            })
            .collect()
    }

    async fn delete(&self, id: &AgentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM agents WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
