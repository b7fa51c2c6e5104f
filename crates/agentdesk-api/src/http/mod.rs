//! HTTP/SSE API layer for agentdesk.
//!
//! Axum-based JSON API under `/api/v1/` with an envelope response format,
//! plus the server-sent-event conversation stream.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
