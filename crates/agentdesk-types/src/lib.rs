//! Shared domain types for agentdesk.
//!
//! Agents, conversations, messages, the upstream request shape, the SSE wire
//! frame, configuration structs and the error enums used across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod agent;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod stream;
