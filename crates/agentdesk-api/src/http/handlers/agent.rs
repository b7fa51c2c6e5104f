//! Agent CRUD handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use agentdesk_types::agent::{Agent, UpsertAgentRequest};

use crate::http::error::AppError;
use crate::http::handlers::parse_agent_id;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// POST /api/v1/agents - Create an agent, or update it when `id` is given.
pub async fn upsert_agent(
    State(state): State<AppState>,
    Json(body): Json<UpsertAgentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Agent>>), AppError> {
    let timer = RequestTimer::start();

    let upserted = state.agent_service.upsert(body).await?;
    let status = if upserted.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    let href = format!("/api/v1/agents/{}", upserted.agent.id);
    let resp = timer.respond(upserted.agent).with_link("self", &href);

    Ok((status, Json(resp)))
}

/// GET /api/v1/agents - Most recently updated first.
pub async fn list_agents(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Agent>>>, AppError> {
    let timer = RequestTimer::start();
    let agents = state.agent_service.list().await?;
    Ok(Json(timer.respond(agents).with_link("self", "/api/v1/agents")))
}

/// GET /api/v1/agents/{id}
pub async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Agent>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_agent_id(&id)?;

    let agent = state.agent_service.get(&id).await?;
    let href = format!("/api/v1/agents/{}", agent.id);

    Ok(Json(timer.respond(agent).with_link("self", &href)))
}

/// DELETE /api/v1/agents/{id} - Also removes the agent's conversations.
pub async fn delete_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_agent_id(&id)?;

    state.agent_service.delete(&id).await?;

    Ok(Json(timer.respond(serde_json::json!({
        "id": id,
        "deleted": true,
    }))))
}
