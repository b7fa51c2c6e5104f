//! Conversation store accessor.
//!
//! The relay only reads through this trait (history and the abort flag).
//! Writes come from the conversation service handling other requests.

use agentdesk_types::conversation::{Conversation, ConversationId, Message};
use agentdesk_types::error::RepositoryError;

/// Repository trait for conversations and their messages.
pub trait ConversationRepository: Send + Sync {
    fn create(
        &self,
        conversation: &Conversation,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;

    /// Append a message. Messages are never edited or removed individually.
    fn append_message(
        &self,
        message: &Message,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Full history in creation order.
    fn get_messages(
        &self,
        id: &ConversationId,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Current value of the abort flag, read from the store on every call.
    ///
    /// Returns `RepositoryError::NotFound` for an unknown conversation.
    fn is_aborted(
        &self,
        id: &ConversationId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Set the abort flag. Setting it twice is not an error; it is never
    /// cleared.
    fn mark_aborted(
        &self,
        id: &ConversationId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
