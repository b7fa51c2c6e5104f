//! Model catalogue handler.

use axum::Json;
use axum::extract::State;

use agentdesk_types::agent::ModelInfo;

use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// GET /api/v1/models - The configured model catalogue.
pub async fn list_models(State(state): State<AppState>) -> Json<ApiResponse<Vec<ModelInfo>>> {
    let timer = RequestTimer::start();
    let models = state.config.models.clone();
    Json(timer.respond(models).with_link("self", "/api/v1/models"))
}
