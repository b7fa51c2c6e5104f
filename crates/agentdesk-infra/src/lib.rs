//! Infrastructure layer for agentdesk.
//!
//! Contains implementations of the traits defined in `agentdesk-core`:
//! SQLite repositories, the OpenAI-compatible upstream client, and the
//! `config.toml` loader.

pub mod config;
pub mod llm;
pub mod sqlite;
