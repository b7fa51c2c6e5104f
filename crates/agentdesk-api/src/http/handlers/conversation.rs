//! Conversation lifecycle handlers: start, inspect, post, abort, record reply.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use agentdesk_types::conversation::{ConversationDetail, Message};
use agentdesk_types::error::AgentError;

use crate::http::error::AppError;
use crate::http::handlers::parse_conversation_id;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartConversationRequest {
    #[serde(default, alias = "agentId")]
    pub agent_id: Option<String>,
}

/// Body of the message and reply endpoints.
#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    #[serde(default)]
    pub content: String,
}

/// POST /api/v1/conversations - Start an empty conversation with an agent.
pub async fn start_conversation(
    State(state): State<AppState>,
    Json(body): Json<StartConversationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ConversationDetail>>), AppError> {
    let timer = RequestTimer::start();

    let raw = body
        .agent_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("agent_id is required".to_string()))?;
    let agent_id = raw
        .trim()
        .parse()
        .map_err(|_| AppError::Agent(AgentError::NotFound))?;

    let conversation = state.conversation_service.start(&agent_id).await?;
    let href = format!("/api/v1/conversations/{}", conversation.id);
    let stream_href = format!("{href}/stream");

    let detail = ConversationDetail {
        conversation,
        history: Vec::new(),
    };
    let resp = timer
        .respond(detail)
        .with_link("self", &href)
        .with_link("stream", &stream_href);

    Ok((StatusCode::CREATED, Json(resp)))
}

/// GET /api/v1/conversations/{id} - Conversation with its ordered history.
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ConversationDetail>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_conversation_id(&id)?;

    let detail = state.conversation_service.detail(&id).await?;
    let href = format!("/api/v1/conversations/{id}");

    Ok(Json(timer.respond(detail).with_link("self", &href)))
}

/// POST /api/v1/conversations/{id}/messages - Store a user message.
///
/// Returns the id to open the stream with, which is the conversation id.
pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ContentRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_conversation_id(&id)?;

    let message = state
        .conversation_service
        .post_user_message(&id, &body.content)
        .await?;
    let stream_href = format!("/api/v1/conversations/{id}/stream");

    let resp = timer
        .respond(serde_json::json!({
            "stream_id": id,
            "message_id": message.id,
        }))
        .with_link("stream", &stream_href);

    Ok(Json(resp))
}

/// POST /api/v1/conversations/{id}/abort - Set the sticky abort flag.
pub async fn abort_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_conversation_id(&id)?;

    state.conversation_service.abort(&id).await?;

    Ok(Json(timer.respond(serde_json::json!({ "status": "aborted" }))))
}

/// POST /api/v1/conversations/{id}/replies - Persist an assistant reply.
pub async fn record_reply(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ContentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Message>>), AppError> {
    let timer = RequestTimer::start();
    let id = parse_conversation_id(&id)?;

    let message = state
        .conversation_service
        .record_reply(&id, &body.content)
        .await?;

    Ok((StatusCode::CREATED, Json(timer.respond(message))))
}
