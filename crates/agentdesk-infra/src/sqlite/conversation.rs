//! SQLite implementation of [`ConversationRepository`].
//!
//! `is_aborted` always hits the reader pool; there is no cache, so an abort
//! written by one request is seen by every stream's next poll.

use sqlx::Row;
use uuid::Uuid;

use agentdesk_core::repository::conversation::ConversationRepository;
use agentdesk_types::agent::AgentId;
use agentdesk_types::conversation::{Conversation, ConversationId, Message, Role};
use agentdesk_types::error::RepositoryError;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

#[derive(Clone)]
pub struct SqliteConversationRepository {
    pool: DatabasePool,
}

impl SqliteConversationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ConversationRow {
    id: String,
    agent_id: String,
    aborted: bool,
    created_at: String,
    updated_at: String,
}

impl ConversationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            agent_id: row.try_get("agent_id")?,
            aborted: row.try_get("aborted")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_conversation(self) -> Result<Conversation, RepositoryError> {
        Ok(Conversation {
            id: ConversationId(parse_uuid(&self.id, "conversation id")?),
            agent_id: AgentId::from_uuid(parse_uuid(&self.agent_id, "agent_id")?),
            aborted: self.aborted,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

struct MessageRow {
    id: String,
    conversation_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let role: Role = self.role.parse().map_err(RepositoryError::Query)?;

        Ok(Message {
            id: parse_uuid(&self.id, "message id")?,
            conversation_id: ConversationId(parse_uuid(&self.conversation_id, "conversation_id")?),
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(s).map_err(|e| RepositoryError::Query(format!("invalid {what}: {e}")))
}

impl ConversationRepository for SqliteConversationRepository {
    async fn create(&self, conversation: &Conversation) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO conversations (id, agent_id, aborted, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(conversation.id.to_string())
        .bind(conversation.agent_id.to_string())
        .bind(conversation.aborted)
        .bind(format_datetime(&conversation.created_at))
        .bind(format_datetime(&conversation.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let conv_row = ConversationRow::from_row(&row).map_err(query_error)?;
                Ok(Some(conv_row.into_conversation()?))
            }
            None => Ok(None),
        }
    }

    async fn append_message(&self, message: &Message) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        sqlx::query(
            r#"INSERT INTO messages (id, conversation_id, role, content, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.conversation_id.to_string())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => RepositoryError::NotFound,
            _ => query_error(e),
        })?;

        sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
            .bind(format_datetime(&message.created_at))
            .bind(message.conversation_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;
        Ok(())
    }

    async fn get_messages(&self, id: &ConversationId) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM messages WHERE conversation_id = ? ORDER BY seq ASC")
            .bind(id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| {
                MessageRow::from_row(row)
                    .map_err(query_error)
                    .and_then(MessageRow::into_message)
            })
            .collect()
    }

    async fn is_aborted(&self, id: &ConversationId) -> Result<bool, RepositoryError> {
        let row: Option<(bool,)> = sqlx::query_as("SELECT aborted FROM conversations WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.map(|(aborted,)| aborted).ok_or(RepositoryError::NotFound)
    }

    async fn mark_aborted(&self, id: &ConversationId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE conversations SET aborted = 1, updated_at = ? WHERE id = ?")
            .bind(format_datetime(&chrono::Utc::now()))
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
