//! Repository trait definitions (ports) for persistence.

pub mod agent;
pub mod conversation;
