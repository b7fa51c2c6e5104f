//! Axum router configuration with middleware.
//!
//! All JSON routes are under `/api/v1/`; `/health` sits at the root.
//! Middleware: CORS (any origin) and request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/models", get(handlers::model::list_models))
        // Agents
        .route(
            "/agents",
            get(handlers::agent::list_agents).post(handlers::agent::upsert_agent),
        )
        .route(
            "/agents/{id}",
            get(handlers::agent::get_agent).delete(handlers::agent::delete_agent),
        )
        // Conversations
        .route(
            "/conversations",
            post(handlers::conversation::start_conversation),
        )
        .route(
            "/conversations/{id}",
            get(handlers::conversation::get_conversation),
        )
        .route(
            "/conversations/{id}/messages",
            post(handlers::conversation::post_message),
        )
        .route(
            "/conversations/{id}/abort",
            post(handlers::conversation::abort_conversation),
        )
        .route(
            "/conversations/{id}/replies",
            post(handlers::conversation::record_reply),
        )
        .route(
            "/conversations/{id}/stream",
            get(handlers::stream::stream_conversation),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
