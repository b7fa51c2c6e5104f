//! Services orchestrating repositories for the HTTP layer.

pub mod agent;
pub mod conversation;
