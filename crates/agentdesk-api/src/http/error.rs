//! Application error type mapping to HTTP status codes and the envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use agentdesk_types::error::{AgentError, ConversationError, RelayError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Agent(AgentError),
    Conversation(ConversationError),
    /// Failures while opening a conversation stream, before any frame is sent.
    Relay(RelayError),
    Validation(String),
}

impl From<AgentError> for AppError {
    fn from(e: AgentError) -> Self {
        AppError::Agent(e)
    }
}

impl From<ConversationError> for AppError {
    fn from(e: ConversationError) -> Self {
        AppError::Conversation(e)
    }
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        AppError::Relay(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Agent(AgentError::NotFound)
            | AppError::Conversation(ConversationError::AgentNotFound)
            | AppError::Relay(RelayError::AgentNotFound) => {
                (StatusCode::NOT_FOUND, "AGENT_NOT_FOUND", "Agent not found".to_string())
            }
            AppError::Conversation(ConversationError::NotFound)
            | AppError::Relay(RelayError::ConversationNotFound) => (
                StatusCode::NOT_FOUND,
                "CONVERSATION_NOT_FOUND",
                "Conversation not found".to_string(),
            ),
            AppError::Agent(e @ AgentError::InvalidName(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Conversation(e @ ConversationError::EmptyContent) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Relay(e @ RelayError::UpstreamUnavailable { .. }) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "UPSTREAM_NOT_CONFIGURED",
                e.to_string(),
            ),
            AppError::Agent(AgentError::StorageError(_))
            | AppError::Conversation(ConversationError::StorageError(_))
            | AppError::Relay(RelayError::StorageError(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "Storage error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = ?self, code, "request failed");
        }

        let request_id = uuid::Uuid::now_v7().to_string();
        let body = ApiResponse::error(code, &message, request_id, 0);

        (status, Json(body)).into_response()
    }
}
