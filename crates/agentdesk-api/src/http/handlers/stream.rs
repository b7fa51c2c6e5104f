//! Server-sent-event conversation stream.
//!
//! GET /api/v1/conversations/{id}/stream
//!
//! Every event carries only a `data` field: assistant fragments, at most one
//! `**Error**: ...` fragment, and finally `[END]`. Failures detected before
//! the first frame are returned as ordinary JSON errors instead.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::HeaderName;
use axum::http::header::CACHE_CONTROL;
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::StreamExt;

use crate::http::error::AppError;
use crate::http::handlers::parse_conversation_id;
use crate::state::AppState;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

pub async fn stream_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_conversation_id(&id)?;
    let frames = state.relay.open(&id).await?;

    let events = frames.map(|frame| Ok::<_, Infallible>(Event::default().data(frame.data())));
    let sse = Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL));

    Ok((
        [
            (CACHE_CONTROL, "no-cache"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        sse,
    ))
}
